//! App-level middleware.

use std::sync::Arc;

use http::StatusCode;
use trove_core::{response, BoxFuture, Request, RequestContext, Response};
use trove_middleware::{Middleware, Next};

use crate::models::Comparison;
use crate::store::ComparisonStore;

/// The caller's comparisons, loaded by [`LoadUserComparisons`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserComparisons(pub Vec<Comparison>);

/// Loads the caller's comparisons into the request context.
///
/// Mount after [`AuthGuard`](trove_middleware::AuthGuard). A store failure
/// is logged and leaves an empty list rather than failing the request.
pub struct LoadUserComparisons {
    store: Arc<dyn ComparisonStore>,
}

impl LoadUserComparisons {
    /// Creates the stage reading from `store`.
    pub fn new(store: Arc<dyn ComparisonStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for LoadUserComparisons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadUserComparisons").finish_non_exhaustive()
    }
}

impl Middleware for LoadUserComparisons {
    fn name(&self) -> &'static str {
        "load_user_comparisons"
    }

    fn process<'a>(
        &'a self,
        mut ctx: RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(user_id) = ctx.identity().map(|identity| identity.user_id) else {
                return response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "User not found in context",
                );
            };
            let comparisons = self.store.list_for(user_id).unwrap_or_else(|err| {
                tracing::warn!(user_id, error = %err, "failed to load comparisons");
                Vec::new()
            });
            ctx.insert(UserComparisons(comparisons));
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use trove_core::{handler_fn, Identity, Role, TroveError, TroveResult};
    use trove_middleware::Pipeline;

    use crate::models::{ComparisonUpdate, NewComparison};
    use crate::store::MemoryComparisonStore;

    struct FailingStore;

    impl ComparisonStore for FailingStore {
        fn create(&self, _: i64, _: NewComparison) -> TroveResult<Comparison> {
            Err(TroveError::internal("down"))
        }
        fn list_for(&self, _: i64) -> TroveResult<Vec<Comparison>> {
            Err(TroveError::internal("down"))
        }
        fn get(&self, _: i64, _: i64) -> TroveResult<Option<Comparison>> {
            Err(TroveError::internal("down"))
        }
        fn update(&self, _: i64, _: i64, _: ComparisonUpdate) -> TroveResult<Option<Comparison>> {
            Err(TroveError::internal("down"))
        }
        fn delete(&self, _: i64, _: i64) -> TroveResult<bool> {
            Err(TroveError::internal("down"))
        }
        fn set_public_link(
            &self,
            _: i64,
            _: i64,
            _: Option<String>,
        ) -> TroveResult<Option<Comparison>> {
            Err(TroveError::internal("down"))
        }
        fn find_by_public_link(&self, _: &str) -> TroveResult<Option<Comparison>> {
            Err(TroveError::internal("down"))
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/comparisons")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn as_user(user_id: i64) -> RequestContext {
        let mut ctx = RequestContext::default();
        ctx.set_identity(Identity::new(user_id, 1, "Ada", Role::User));
        ctx
    }

    async fn loaded_count(store: Arc<dyn ComparisonStore>, ctx: RequestContext) -> Response {
        Pipeline::new()
            .with(LoadUserComparisons::new(store))
            .wrap(handler_fn(|ctx, _req| async move {
                let count = ctx
                    .get::<UserComparisons>()
                    .map_or_else(|| "missing".to_string(), |c| c.0.len().to_string());
                response::text(StatusCode::OK, count)
            }))
            .call(ctx, request())
            .await
    }

    async fn body(response: Response) -> String {
        let bytes = response::body_bytes(response.into_body()).await;
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_loads_only_callers_comparisons() {
        let store = Arc::new(MemoryComparisonStore::new());
        for user_id in [7, 7, 8] {
            store
                .create(
                    user_id,
                    NewComparison {
                        name: "Kettles".to_string(),
                        items: Vec::new(),
                        price_rating_weight: 20,
                        pros_cons_rating_weight: 80,
                    },
                )
                .unwrap();
        }

        let response = loaded_count(store, as_user(7)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "2");
    }

    #[tokio::test]
    async fn test_store_failure_yields_empty_list() {
        let response = loaded_count(Arc::new(FailingStore), as_user(7)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "0");
    }

    #[tokio::test]
    async fn test_without_identity_is_server_error() {
        let store = Arc::new(MemoryComparisonStore::new());
        let response = loaded_count(store, RequestContext::default()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
