//! Contest service

use chrono::Duration;
use tracing::info;

use crate::{
    api::ContestApi,
    error::{AppError, AppResult},
    models::Contest,
    session::{SessionContext, SessionStore},
    utils::{validate_contest_id, validate_username},
};

/// Contest service for joining and opening contests
pub struct ContestService;

impl ContestService {
    /// Join a contest and remember the participant
    pub async fn join(
        api: &dyn ContestApi,
        store: &SessionStore,
        contest_id: &str,
        username: &str,
    ) -> AppResult<SessionContext> {
        let contest_id = contest_id.trim();
        let username = username.trim();

        if contest_id.is_empty() || username.is_empty() {
            return Err(AppError::Validation(
                "Please enter both contest ID and username".to_string(),
            ));
        }
        validate_contest_id(contest_id).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_username(username).map_err(|e| AppError::Validation(e.to_string()))?;

        // Joining an unknown contest must not leave a session behind
        let contest = api.get_contest(contest_id).await?;

        let session = SessionContext::new(&contest.contest_id, username);
        store.save(&session).await?;

        info!(contest_id = %session.contest_id, username = %session.username, "Joined contest");
        Ok(session)
    }

    /// Gate access with the session, then fetch the contest
    pub async fn open(
        api: &dyn ContestApi,
        session: &SessionContext,
        contest_id: &str,
        ttl: Option<Duration>,
    ) -> AppResult<Contest> {
        session.authorize(contest_id, ttl)?;
        api.get_contest(contest_id.trim()).await
    }

    /// Open `contest_id`, or the saved session's contest when none is given
    pub async fn open_saved(
        api: &dyn ContestApi,
        store: &SessionStore,
        contest_id: Option<&str>,
        ttl: Option<Duration>,
    ) -> AppResult<(SessionContext, Contest)> {
        let session = match contest_id {
            Some(contest_id) => store.require(contest_id, ttl).await?,
            None => store.current(ttl).await?,
        };
        let contest_id = contest_id.unwrap_or(&session.contest_id);
        let contest = Self::open(api, &session, contest_id, ttl).await?;
        Ok((session, contest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockContestApi;
    use crate::utils::parse_datetime;
    use tempfile::TempDir;

    fn contest(contest_id: &str) -> Contest {
        Contest {
            id: 1,
            contest_id: contest_id.to_string(),
            name: "Sample Programming Contest".to_string(),
            description: String::new(),
            start_time: parse_datetime("2024-01-15T10:00:00").unwrap(),
            end_time: parse_datetime("2024-01-15T12:00:00").unwrap(),
            problems: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_join_requires_both_fields() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let api = MockContestApi::new();

        let err = ContestService::join(&api, &store, "CONTEST001", "   ")
            .await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Please enter both contest ID and username")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_join_unknown_contest_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut api = MockContestApi::new();
        api.expect_get_contest()
            .times(1)
            .returning(|id| Err(AppError::NotFound(format!("Contest not found with ID: {id}"))));

        let err = ContestService::join(&api, &store, "NOPE", "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_join_saves_session() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut api = MockContestApi::new();
        api.expect_get_contest()
            .times(1)
            .returning(|id| Ok(contest(id)));

        let session = ContestService::join(&api, &store, " CONTEST001 ", " alice ")
            .await
            .unwrap();

        assert_eq!(session.contest_id, "CONTEST001");
        assert_eq!(session.username, "alice");
        assert_eq!(store.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_open_other_contest_is_gated() {
        // No expectations: the gate must fail before any request
        let api = MockContestApi::new();
        let session = SessionContext::new("CONTEST001", "alice");

        let err = ContestService::open(&api, &session, "CONTEST002", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SessionRequired(_)));
    }

    #[tokio::test]
    async fn test_open_fetches_contest() {
        let mut api = MockContestApi::new();
        api.expect_get_contest()
            .times(1)
            .returning(|id| Ok(contest(id)));
        let session = SessionContext::new("CONTEST001", "alice");

        let contest = ContestService::open(&api, &session, "CONTEST001", None)
            .await
            .unwrap();

        assert_eq!(contest.contest_id, "CONTEST001");
    }

    #[tokio::test]
    async fn test_open_saved_gates_named_contest() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut api = MockContestApi::new();
        api.expect_get_contest()
            .times(2)
            .returning(|id| Ok(contest(id)));

        let err = ContestService::open_saved(&api, &store, Some("CONTEST001"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionRequired(ref msg) if msg.contains("CONTEST001")));

        store
            .save(&SessionContext::new("CONTEST001", "alice"))
            .await
            .unwrap();

        let err = ContestService::open_saved(&api, &store, Some("CONTEST002"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionRequired(_)));

        let (session, named) = ContestService::open_saved(&api, &store, Some(" CONTEST001 "), None)
            .await
            .unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(named.contest_id, "CONTEST001");

        let (_, saved) = ContestService::open_saved(&api, &store, None, None)
            .await
            .unwrap();
        assert_eq!(saved.contest_id, "CONTEST001");
    }
}
