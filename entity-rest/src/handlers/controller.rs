//! Generic REST controller
//!
//! [`ResourceController`] mounts the six routes of one resource type on top of
//! a [`CrudService`]:
//!
//! | Method   | Path              | Success                       |
//! |----------|-------------------|-------------------------------|
//! | `GET`    | `{base}`          | 200, paginated list           |
//! | `GET`    | `{base}/count`    | 200, matching row count       |
//! | `GET`    | `{base}/{id}`     | 200, detail                   |
//! | `POST`   | `{base}`          | 201, detail + `Location`      |
//! | `PUT`    | `{base}/{id}`     | 200, detail                   |
//! | `DELETE` | `{base}/{id}`     | 204                           |
//!
//! [`ResourceController::soft_delete_router`] mounts the same routes for
//! soft-deletable entities, with `DELETE` keeping the row and one more route:
//!
//! | Method   | Path                  | Success                   |
//! |----------|-----------------------|---------------------------|
//! | `POST`   | `{base}/{id}/restore` | 200, detail               |
//!
//! Success messages are keys in the controller's [`MessageNamespace`]:
//! `{ns}.fetched`, `{ns}.counted`, `{ns}.created`, `{ns}.updated`,
//! `{ns}.restored`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::{HeaderMap, HeaderName, Uri},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::de::DeserializeOwned;

use crate::catalog::MessageNamespace;
use crate::config::{Config, PaginationConfig};
use crate::crud::{CreateHooks, CrudService, FetchByIdHooks, ResourceHooks, UpdateHooks};
use crate::repository::{Entity, Repository, SoftDeletable, SoftDeleteRepository};

use super::error::{ApiError, ApiOperation};
use super::query::ListQuery;
use super::response::{ApiResponse, Created, NoContent, ResponseMeta};
use super::transformer::Transformer;
use super::validation::Validate;

const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Routes of one resource type
///
/// # Example
///
/// ```rust,ignore
/// let users = ResourceController::new(
///     "/api/users",
///     MessageNamespace::new("user"),
///     CrudService::new(InMemoryRepository::new(), UserHooks),
///     UserTransformer,
/// )
/// .with_config(&config);
///
/// let app = Router::new().merge(users.router());
/// ```
pub struct ResourceController<E, R, H, T> {
    service: CrudService<E, R, H>,
    transformer: T,
    base_path: String,
    namespace: MessageNamespace,
    pagination: PaginationConfig,
    request_id_header: HeaderName,
}

impl<E, R, H, T> ResourceController<E, R, H, T>
where
    E: Entity,
    R: Repository<E> + 'static,
    H: ResourceHooks<E> + 'static,
    <H as FetchByIdHooks<E>>::NotFound: Into<ApiError> + Send,
    <H as CreateHooks<E>>::CreateRequest: DeserializeOwned + Validate,
    <H as UpdateHooks<E>>::UpdateRequest: DeserializeOwned + Validate,
    T: Transformer<E>,
{
    /// Controller for `service`, mounted at `base_path`
    pub fn new(
        base_path: impl Into<String>,
        namespace: MessageNamespace,
        service: CrudService<E, R, H>,
        transformer: T,
    ) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            service,
            transformer,
            base_path,
            namespace,
            pagination: PaginationConfig::default(),
            request_id_header: HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER),
        }
    }

    /// Apply paging limits, cursor threshold and request id header from `config`
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.pagination = config.pagination;
        self.service = self
            .service
            .with_cursor_threshold(config.pagination.cursor_threshold);
        match HeaderName::try_from(config.middleware.request_id_header.as_str()) {
            Ok(header) => self.request_id_header = header,
            Err(_) => tracing::warn!(
                header = %config.middleware.request_id_header,
                "Invalid request id header name, keeping default"
            ),
        }
        self
    }

    /// Base path the routes are mounted under
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The underlying service
    pub fn service(&self) -> &CrudService<E, R, H> {
        &self.service
    }

    /// Router with the six routes; state is already applied
    pub fn router(self) -> Router {
        let item = get(Self::find).put(Self::update).delete(Self::delete);
        self.mount(item, Router::new())
    }

    fn mount(self, item: MethodRouter<Arc<Self>>, extra: Router<Arc<Self>>) -> Router {
        let base = self.base_path.clone();
        tracing::debug!(resource = E::schema().table, base = %base, "Mounting resource routes");

        Router::new()
            .route(&base, get(Self::list).post(Self::create))
            .route(&format!("{base}/count"), get(Self::count))
            .route(&format!("{base}/{{id}}"), item)
            .merge(extra)
            .with_state(Arc::new(self))
    }

    fn meta(&self, headers: &HeaderMap) -> ResponseMeta {
        let meta = ResponseMeta::now();
        match headers
            .get(&self.request_id_header)
            .and_then(|value| value.to_str().ok())
        {
            Some(request_id) => meta.with_request_id(request_id),
            None => meta,
        }
    }

    fn parse_id(raw: &str, operation: ApiOperation) -> Result<E::Id, ApiError> {
        raw.parse()
            .map_err(|_| ApiError::malformed(operation, format!("invalid identifier '{raw}'")))
    }

    fn query_request(
        &self,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
        operation: ApiOperation,
    ) -> Result<crate::crud::QueryRequest, ApiError> {
        let Query(params) = query.map_err(|e| ApiError::malformed(operation, e.body_text()))?;
        Ok(ListQuery::from_params(params, &self.pagination))
    }

    async fn list(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<ApiResponse<Vec<T::Index>>, ApiError> {
        let request = ctl.query_request(query, ApiOperation::List)?;
        let page = ctl
            .service
            .fetch_all(&request)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::List))?;

        let page = page.map(|entity| ctl.transformer.to_index(entity));
        Ok(ApiResponse::page(ctl.namespace.key("fetched"), page).with_meta(ctl.meta(&headers)))
    }

    async fn count(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<ApiResponse<u64>, ApiError> {
        let request = ctl.query_request(query, ApiOperation::Count)?;
        let total = ctl
            .service
            .count(&request)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Count))?;

        Ok(ApiResponse::success(ctl.namespace.key("counted"), total).with_meta(ctl.meta(&headers)))
    }

    async fn find(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        Path(raw_id): Path<String>,
    ) -> Result<ApiResponse<T::Detail>, ApiError> {
        let id = Self::parse_id(&raw_id, ApiOperation::Get)?;
        let entity = ctl
            .service
            .find_by_id(&id)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Get))?;

        let detail = ctl.transformer.to_detail(entity);
        Ok(ApiResponse::success(ctl.namespace.key("fetched"), detail).with_meta(ctl.meta(&headers)))
    }

    async fn create(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        body: Result<Json<<H as CreateHooks<E>>::CreateRequest>, JsonRejection>,
    ) -> Result<Created<T::Detail>, ApiError> {
        let Json(body) = body.map_err(|e| ApiError::malformed(ApiOperation::Create, e.body_text()))?;
        body.validate()
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Create))?;

        let entity = ctl
            .service
            .create(body)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Create))?;

        let location = format!("{}/{}", ctl.base_path, entity.id());
        let detail = ctl.transformer.to_created(entity);
        let body =
            ApiResponse::success(ctl.namespace.key("created"), detail).with_meta(ctl.meta(&headers));
        Ok(Created::new(location, body))
    }

    async fn update(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        Path(raw_id): Path<String>,
        body: Result<Json<<H as UpdateHooks<E>>::UpdateRequest>, JsonRejection>,
    ) -> Result<ApiResponse<T::Detail>, ApiError> {
        let id = Self::parse_id(&raw_id, ApiOperation::Update)?;
        let Json(body) = body.map_err(|e| ApiError::malformed(ApiOperation::Update, e.body_text()))?;
        body.validate().map_err(|e| {
            ApiError::from(e)
                .with_operation(ApiOperation::Update)
                .with_entity(E::schema().table, raw_id.as_str())
        })?;

        let entity = ctl
            .service
            .update(&id, body)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;

        let detail = ctl.transformer.to_updated(entity);
        Ok(ApiResponse::success(ctl.namespace.key("updated"), detail).with_meta(ctl.meta(&headers)))
    }

    async fn delete(
        State(ctl): State<Arc<Self>>,
        Path(raw_id): Path<String>,
    ) -> Result<NoContent, ApiError> {
        let id = Self::parse_id(&raw_id, ApiOperation::Delete)?;
        ctl.service
            .delete(&id)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Delete))?;
        Ok(NoContent)
    }
}

impl<E, R, H, T> ResourceController<E, R, H, T>
where
    E: SoftDeletable,
    R: SoftDeleteRepository<E> + 'static,
    H: ResourceHooks<E> + 'static,
    <H as FetchByIdHooks<E>>::NotFound: Into<ApiError> + Send,
    <H as CreateHooks<E>>::CreateRequest: DeserializeOwned + Validate,
    <H as UpdateHooks<E>>::UpdateRequest: DeserializeOwned + Validate,
    T: Transformer<E>,
{
    /// Router where `DELETE` soft-deletes, plus `POST {base}/{id}/restore`
    pub fn soft_delete_router(self) -> Router {
        let item = get(Self::find).put(Self::update).delete(Self::soft_delete);
        let restore = Router::new().route(
            &format!("{}/{{id}}/restore", self.base_path),
            post(Self::restore),
        );
        self.mount(item, restore)
    }

    async fn soft_delete(
        State(ctl): State<Arc<Self>>,
        Path(raw_id): Path<String>,
    ) -> Result<NoContent, ApiError> {
        let id = Self::parse_id(&raw_id, ApiOperation::Delete)?;
        ctl.service
            .soft_delete(&id)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Delete))?;
        Ok(NoContent)
    }

    async fn restore(
        State(ctl): State<Arc<Self>>,
        headers: HeaderMap,
        Path(raw_id): Path<String>,
    ) -> Result<ApiResponse<T::Detail>, ApiError> {
        let id = Self::parse_id(&raw_id, ApiOperation::Restore)?;
        let entity = ctl
            .service
            .restore(&id)
            .await
            .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Restore))?;

        let detail = ctl.transformer.to_detail(entity);
        Ok(ApiResponse::success(ctl.namespace.key("restored"), detail).with_meta(ctl.meta(&headers)))
    }
}

/// Fallback for paths no resource claims
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

/// Fallback for a known path with an unsupported method
pub async fn method_not_supported() -> ApiError {
    ApiError::method_not_supported()
}

/// Attach the catalogued 404 and 405 fallbacks to `router`
pub fn with_fallbacks(router: Router) -> Router {
    router
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::fixture::{member, Member, MemberHooks};
    use crate::handlers::Identity;
    use crate::repository::InMemoryRepository;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn controller() -> ResourceController<Member, InMemoryRepository<Member>, MemberHooks, Identity> {
        let repository = InMemoryRepository::with_entities([
            member(1, "John", "ACTIVE"),
            member(2, "Mary", "LOCKED"),
            member(3, "Joan", "ACTIVE"),
            member(4, "Pete", "ACTIVE"),
            member(5, "Anna", "SUSPENDED"),
        ]);
        ResourceController::new(
            "/api/members/",
            MessageNamespace::new("member"),
            CrudService::new(repository, MemberHooks::restricted()),
            Identity,
        )
    }

    fn app() -> Router {
        with_fallbacks(controller().router())
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn names(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_list_filters_by_allow_list_only() {
        let app = app();
        let (status, _, body) = send(
            &app,
            request(Method::GET, "/api/members?status=ACTIVE&email=x&sort=name", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "member.fetched");
        assert_eq!(names(&body), vec!["Joan", "John", "Pete"]);
        assert_eq!(
            body["pagination"],
            json!({"type": "LENGTH_AWARE", "page": 1, "per_page": 20, "total_pages": 1, "total_items": 3})
        );
    }

    #[tokio::test]
    async fn test_list_search() {
        let app = app();
        let (_, _, body) = send(&app, request(Method::GET, "/api/members?q=JO&sort=name", None)).await;
        assert_eq!(names(&body), vec!["Joan", "John"]);
    }

    #[tokio::test]
    async fn test_cursor_walk() {
        let app = app();
        let first_cursor = Uuid::from_u128(6).to_string();
        let (_, _, body) = send(
            &app,
            request(Method::GET, &format!("/api/members?size=2&cursor={first_cursor}"), None),
        )
        .await;
        assert_eq!(names(&body), vec!["Anna", "Pete"]);
        assert_eq!(body["pagination"]["type"], "CURSOR");
        assert_eq!(body["pagination"]["has_more"], true);

        let next = body["pagination"]["next_cursor"].as_str().unwrap().to_string();
        let (_, _, body) = send(
            &app,
            request(Method::GET, &format!("/api/members?size=2&cursor={next}"), None),
        )
        .await;
        assert_eq!(names(&body), vec!["Joan", "Mary"]);

        let next = body["pagination"]["next_cursor"].as_str().unwrap().to_string();
        let (_, _, body) = send(
            &app,
            request(Method::GET, &format!("/api/members?size=2&cursor={next}"), None),
        )
        .await;
        assert_eq!(names(&body), vec!["John"]);
        assert_eq!(body["pagination"]["has_more"], false);
        assert_eq!(body["pagination"]["next_cursor"], Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_empty_page() {
        let app = app();
        let (status, _, body) =
            send(&app, request(Method::GET, "/api/members?cursor=not-a-uuid", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["has_more"], false);
        assert_eq!(body["pagination"]["next_cursor"], Value::Null);
    }

    #[tokio::test]
    async fn test_high_page_switches_to_cursor() {
        let app = app();
        let (_, _, body) = send(&app, request(Method::GET, "/api/members?page=101&size=2", None)).await;
        assert_eq!(body["pagination"]["type"], "CURSOR");
        assert_eq!(names(&body), vec!["Anna", "Pete"]);
    }

    #[tokio::test]
    async fn test_count_honours_filters() {
        let app = app();
        let (status, _, body) =
            send(&app, request(Method::GET, "/api/members/count?status=ACTIVE", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "member.counted");
        assert_eq!(body["data"], 3);
    }

    #[tokio::test]
    async fn test_get_found_and_missing() {
        let app = app();
        let id = Uuid::from_u128(2);
        let (status, _, body) = send(&app, request(Method::GET, &format!("/api/members/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Mary");

        let missing = Uuid::from_u128(42);
        let (status, _, body) =
            send(&app, request(Method::GET, &format!("/api/members/{missing}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["code"], "RES-MBR-0001");
        assert_eq!(body["message"], format!("Member {missing} was not found"));
    }

    #[tokio::test]
    async fn test_get_malformed_id() {
        let app = app();
        let (status, _, body) = send(&app, request(Method::GET, "/api/members/42", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["code"], "REQ-4001");
    }

    #[tokio::test]
    async fn test_create_sets_location() {
        let app = app();
        let (status, headers, body) = send(
            &app,
            request(
                Method::POST,
                "/api/members",
                Some(json!({"name": "Zoe", "email": "zoe@example.com"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "member.created");
        assert_eq!(body["data"]["status"], "PENDING");
        let id = body["data"]["id"].as_str().unwrap();
        assert_eq!(headers[header::LOCATION], format!("/api/members/{id}"));

        let (_, _, body) = send(&app, request(Method::GET, "/api/members/count", None)).await;
        assert_eq!(body["data"], 6);
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let app = app();
        let (status, _, body) = send(
            &app,
            request(Method::POST, "/api/members", Some(json!({"name": " ", "email": "nope"}))),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["code"], "VAL-4001");
        assert_eq!(body["errors"]["field_errors"]["name"], json!(["validation.required"]));
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.email"]));
    }

    #[tokio::test]
    async fn test_create_taken_email_is_unique_failure() {
        let app = app();
        let (status, _, body) = send(
            &app,
            request(
                Method::POST,
                "/api/members",
                Some(json!({"name": "Johnny", "email": "john@example.com"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["code"], "VAL-4001");
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.unique"]));

        let (_, _, body) = send(&app, request(Method::GET, "/api/members/count", None)).await;
        assert_eq!(body["data"], 5);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_unique_failure() {
        let app = app();
        let uri = format!("/api/members/{}", Uuid::from_u128(2));
        let (status, _, body) = send(
            &app,
            request(Method::PUT, &uri, Some(json!({"email": "pete@example.com"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.unique"]));
    }

    #[tokio::test]
    async fn test_soft_delete_routes() {
        let app = with_fallbacks(controller().soft_delete_router());
        let id = Uuid::from_u128(3);
        let uri = format!("/api/members/{id}");

        let (status, _, _) = send(&app, request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, body) = send(&app, request(Method::GET, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-MBR-0001");

        let (_, _, body) = send(&app, request(Method::GET, "/api/members/count", None)).await;
        assert_eq!(body["data"], 4);

        let (status, _, body) =
            send(&app, request(Method::POST, &format!("{uri}/restore"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "member.restored");
        assert_eq!(body["data"]["name"], "Joan");
        assert_eq!(body["data"]["deleted_at"], Value::Null);

        let (status, _, body) =
            send(&app, request(Method::POST, &format!("{uri}/restore"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-MBR-0001");

        let (_, _, body) = send(&app, request(Method::GET, "/api/members/count", None)).await;
        assert_eq!(body["data"], 5);
    }

    #[tokio::test]
    async fn test_create_malformed_body() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/members")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["code"], "REQ-4001");
    }

    #[tokio::test]
    async fn test_update_and_missing_update() {
        let app = app();
        let id = Uuid::from_u128(2);
        let (status, _, body) = send(
            &app,
            request(Method::PUT, &format!("/api/members/{id}"), Some(json!({"status": "ACTIVE"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "member.updated");
        assert_eq!(body["data"]["status"], "ACTIVE");
        assert_eq!(body["data"]["name"], "Mary");

        let missing = Uuid::from_u128(77);
        let (status, _, body) = send(
            &app,
            request(Method::PUT, &format!("/api/members/{missing}"), Some(json!({"name": "X"}))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-MBR-0001");
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let app = app();
        let uri = format!("/api/members/{}", Uuid::from_u128(1));
        let (status, _, body) = send(&app, request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _, body) = send(&app, request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-MBR-0001");
    }

    #[tokio::test]
    async fn test_request_id_in_meta() {
        let app = app();
        let req = Request::builder()
            .uri("/api/members")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = send(&app, req).await;
        assert_eq!(body["meta"]["request_id"], "req-123");
    }

    #[tokio::test]
    async fn test_fallbacks() {
        let app = app();
        let (status, _, body) = send(&app, request(Method::GET, "/api/unknown", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "REQ-4041");

        let (status, _, body) = send(&app, request(Method::PATCH, "/api/members", None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["errors"]["code"], "REQ-4051");
    }

    #[test]
    fn test_base_path_trimmed() {
        let controller = ResourceController::new(
            "/api/members/",
            MessageNamespace::new("member"),
            CrudService::new(InMemoryRepository::<Member>::new(), MemberHooks::default()),
            Identity,
        );
        assert_eq!(controller.base_path(), "/api/members");
    }
}
