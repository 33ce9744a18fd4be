//! Typed wrappers for the backlog backend
//!
//! Each call is a fixed verb and path over `ApiClient::request`, so all of
//! them share its bearer and refresh-and-retry behavior. Non-2xx responses
//! become `ClientError::Http`.

use serde::de::DeserializeOwned;

use crate::client::ApiClient;
use crate::models::{BacklogList, Game, ReviewRequest, ReviewResponse, User, UserWithGames};
use crate::request::ApiRequest;
use crate::validation::{validate_email, PasswordChange, ValidationError};
use crate::Result;

impl ApiClient {
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.fetch(ApiRequest::get(format!("/users/{}", user_id)))
            .await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.fetch(ApiRequest::get("/users/profile")).await
    }

    pub async fn current_user_with_games(&self) -> Result<UserWithGames> {
        self.fetch(ApiRequest::get("/users/profile/withGames"))
            .await
    }

    pub async fn add_game_to_list(
        &self,
        user_id: i64,
        game_id: i64,
        list: BacklogList,
    ) -> Result<()> {
        let request = ApiRequest::post(format!("/users/{}/addGameToList", user_id))
            .with_query("gameId", game_id)
            .with_query("listName", list.as_str());
        self.execute(request).await?;

        tracing::info!(user_id, game_id, list = %list, "Added game to backlog list");
        Ok(())
    }

    pub async fn remove_game_from_all_lists(&self, user_id: i64, game_id: i64) -> Result<()> {
        let request = ApiRequest::delete(format!("/users/{}/removeGameFromAllLists", user_id))
            .with_query("gameId", game_id);
        self.execute(request).await?;

        tracing::info!(user_id, game_id, "Removed game from all backlog lists");
        Ok(())
    }

    pub async fn all_games(&self) -> Result<Vec<Game>> {
        self.fetch(ApiRequest::get("/games/get/all")).await
    }

    pub async fn game(&self, game_id: i64) -> Result<Game> {
        self.fetch(ApiRequest::get(format!("/games/get/{}", game_id)))
            .await
    }

    /// Ranking is up to the backend; results come back in its order.
    pub async fn search_games(&self, query: &str) -> Result<Vec<Game>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::Required("search query").into());
        }
        self.fetch(ApiRequest::get("/games/search").with_query("q", query))
            .await
    }

    pub async fn popular_games(&self) -> Result<Vec<Game>> {
        self.fetch(ApiRequest::get("/games/popular")).await
    }

    pub async fn latest_games(&self) -> Result<Vec<Game>> {
        self.fetch(ApiRequest::get("/games/latest")).await
    }

    pub async fn update_email(&self, new_email: &str) -> Result<()> {
        let new_email = validate_email(new_email)?;
        self.execute(ApiRequest::patch("/users/updateEmail").with_query("newEmail", new_email))
            .await?;

        tracing::info!("Email updated");
        Ok(())
    }

    pub async fn update_password(&self, change: &PasswordChange) -> Result<()> {
        let new_password = change.validate()?;
        self.execute(
            ApiRequest::patch("/users/updatePassword").with_query("newPassword", new_password),
        )
        .await?;

        tracing::info!("Password updated");
        Ok(())
    }

    /// `None` when the game has no reviews yet.
    pub async fn average_rating(&self, game_id: i64) -> Result<Option<f64>> {
        self.fetch(ApiRequest::get(format!("/reviews/game/{}/average", game_id)))
            .await
    }

    /// `None` when the user has not reviewed the game.
    pub async fn user_review(&self, user_id: i64, game_id: i64) -> Result<Option<ReviewResponse>> {
        let request = ApiRequest::get(format!("/reviews/user/{}/game/{}", user_id, game_id));
        let response = self.request(&request).await?;

        if response.status() == 404 {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        if response.body().is_empty() {
            return Ok(None);
        }
        response.json()
    }

    pub async fn submit_review(&self, review: &ReviewRequest) -> Result<()> {
        self.execute(ApiRequest::post("/reviews/add").with_json(review)?)
            .await?;

        tracing::info!(
            user_id = review.user_id,
            game_id = review.game_id,
            rating = review.rating,
            "Review submitted"
        );
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.request(&request).await?.error_for_status()?.json()
    }

    async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.request(&request).await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::events::ExpiryReason;
    use crate::request::Method;
    use crate::testing::{MockTransport, Reply};
    use backlog_session::{MemorySessionStore, Session, SessionStore};
    use serde_json::json;
    use std::sync::Arc;

    fn authenticated(transport: &Arc<MockTransport>) -> (ApiClient, MemorySessionStore) {
        let store = MemorySessionStore::with_session(Session::new("A1", "R1", "S1").unwrap());
        let client = ApiClient::new(transport.clone(), Arc::new(store.clone()));
        (client, store)
    }

    #[tokio::test]
    async fn test_current_user() {
        let transport = MockTransport::scripted(vec![Reply::json(
            200,
            json!({"id": 7, "username": "alice", "email": "alice@example.com"}),
        )]);
        let (client, _) = authenticated(&transport);

        let user = client.current_user().await.unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.path, "/users/profile");
        assert_eq!(sent.bearer.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_current_user_with_games() {
        let transport = MockTransport::scripted(vec![Reply::json(
            200,
            json!({
                "user": {"id": 7, "username": "alice"},
                "games": [{"id": 1, "name": "Hades"}]
            }),
        )]);
        let (client, _) = authenticated(&transport);

        let profile = client.current_user_with_games().await.unwrap();

        assert_eq!(profile.user.username, "alice");
        assert_eq!(profile.games.len(), 1);
        assert_eq!(transport.requests()[0].path, "/users/profile/withGames");
    }

    #[tokio::test]
    async fn test_add_game_to_list() {
        let transport = MockTransport::scripted(vec![Reply::status(200)]);
        let (client, _) = authenticated(&transport);

        client
            .add_game_to_list(7, 1942, BacklogList::Completed100)
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "/users/7/addGameToList");
        assert_eq!(sent.query_value("gameId"), Some("1942"));
        assert_eq!(sent.query_value("listName"), Some("completed100"));
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn test_remove_game_from_all_lists() {
        let transport = MockTransport::scripted(vec![Reply::status(204)]);
        let (client, _) = authenticated(&transport);

        client.remove_game_from_all_lists(7, 1942).await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Delete);
        assert_eq!(sent.path, "/users/7/removeGameFromAllLists");
        assert_eq!(sent.query_value("gameId"), Some("1942"));
    }

    #[tokio::test]
    async fn test_search_games() {
        let transport = MockTransport::scripted(vec![Reply::json(
            200,
            json!([{"id": 1, "name": "Zelda"}, {"id": 2, "name": "Zelda II"}]),
        )]);
        let (client, _) = authenticated(&transport);

        let games = client.search_games("  zelda ").await.unwrap();

        assert_eq!(games.len(), 2);
        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/games/search");
        assert_eq!(sent.query_value("q"), Some("zelda"));
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected_locally() {
        let transport = MockTransport::scripted(vec![]);
        let (client, _) = authenticated(&transport);

        let err = client.search_games("   ").await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_paths() {
        let transport = MockTransport::scripted(vec![
            Reply::json(200, json!([])),
            Reply::json(200, json!([])),
            Reply::json(200, json!([])),
            Reply::json(200, json!({"id": 5, "name": "Doom"})),
        ]);
        let (client, _) = authenticated(&transport);

        client.all_games().await.unwrap();
        client.popular_games().await.unwrap();
        client.latest_games().await.unwrap();
        let game = client.game(5).await.unwrap();

        assert_eq!(game.name, "Doom");
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec!["/games/get/all", "/games/popular", "/games/latest", "/games/get/5"]
        );
    }

    #[tokio::test]
    async fn test_http_error_surfaces_backend_message() {
        let transport = MockTransport::scripted(vec![Reply::json(
            404,
            json!({"message": "Game not found"}),
        )]);
        let (client, store) = authenticated(&transport);

        let err = client.game(999).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Http { status: 404, ref message } if message == "Game not found"
        ));
        assert!(store.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_update_email() {
        let transport = MockTransport::scripted(vec![Reply::status(200)]);
        let (client, _) = authenticated(&transport);

        client.update_email("new@example.com").await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Patch);
        assert_eq!(sent.path, "/users/updateEmail");
        assert_eq!(sent.query_value("newEmail"), Some("new@example.com"));
    }

    #[tokio::test]
    async fn test_update_password_checks_confirmation() {
        let transport = MockTransport::scripted(vec![Reply::status(200)]);
        let (client, _) = authenticated(&transport);

        let err = client
            .update_password(&PasswordChange::new("hunter2", "hunter3"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::PasswordMismatch)
        ));
        assert!(transport.requests().is_empty());

        client
            .update_password(&PasswordChange::new("hunter2", "hunter2"))
            .await
            .unwrap();
        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/users/updatePassword");
        assert_eq!(sent.query_value("newPassword"), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_reviews() {
        let transport = MockTransport::scripted(vec![
            Reply::json(200, json!(8.5)),
            Reply::json(200, json!(null)),
            Reply::json(200, json!({"rating": 9, "comment": "Great"})),
            Reply::status(404),
            Reply::status(201),
        ]);
        let (client, _) = authenticated(&transport);

        assert_eq!(client.average_rating(5).await.unwrap(), Some(8.5));
        assert_eq!(client.average_rating(6).await.unwrap(), None);

        let review = client.user_review(7, 5).await.unwrap().unwrap();
        assert_eq!(review.rating, 9);
        assert_eq!(review.comment.as_deref(), Some("Great"));
        assert!(client.user_review(7, 6).await.unwrap().is_none());

        client
            .submit_review(&ReviewRequest {
                user_id: 7,
                game_id: 5,
                rating: 9,
                comment: Some("Great".to_string()),
            })
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].path, "/reviews/game/5/average");
        assert_eq!(sent[2].path, "/reviews/user/7/game/5");
        assert_eq!(sent[4].path, "/reviews/add");
        assert_eq!(sent[4].method, Method::Post);
        assert_eq!(
            sent[4].body,
            Some(json!({"userId": 7, "gameId": 5, "rating": 9, "comment": "Great"}))
        );
    }

    #[tokio::test]
    async fn test_domain_call_inherits_refresh() {
        let transport = MockTransport::scripted(vec![
            Reply::status(401),
            Reply::json(200, json!({"accessToken": "A2"})),
            Reply::json(200, json!({"id": 7, "username": "alice"})),
        ]);
        let (client, store) = authenticated(&transport);

        let user = client.current_user().await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(store.load().unwrap().unwrap().access_token, "A2");
    }

    #[tokio::test]
    async fn test_domain_call_reports_expiry() {
        let transport = MockTransport::scripted(vec![Reply::status(401), Reply::status(401)]);
        let (client, store) = authenticated(&transport);

        let err = client
            .add_game_to_list(7, 1, BacklogList::Playing)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::SessionExpired(ExpiryReason::RefreshRejected)
        ));
        assert!(store.load().unwrap().is_none());
    }
}
