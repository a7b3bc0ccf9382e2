//! Identity service
//!
//! Users, roles and permissions, each mounted as a [`ResourceController`]
//! over its own store:
//!
//! - `/api/users` (soft delete, `POST /api/users/{id}/restore`)
//! - `/api/roles`
//! - `/api/permissions`
//!
//! Stores are in-memory by default. With the `database` feature,
//! [`Stores::postgres`] backs all three with PostgreSQL; the expected tables
//! are in `migrations/`.

pub mod permissions;
pub mod roles;
pub mod users;

use axum::Router;
use entity_rest::catalog::MessageNamespace;
use entity_rest::config::Config;
use entity_rest::crud::CrudService;
use entity_rest::handlers::{with_fallbacks, Identity, ResourceController};
use entity_rest::repository::{InMemoryRepository, Repository, SoftDeleteRepository};

#[cfg(feature = "database")]
use entity_rest::repository::sql::PgRepository;

use permissions::{Permission, PermissionHooks};
use roles::{Role, RoleHooks};
use users::{User, UserHooks, UserTransformer};

/// Backing stores; clones share storage
#[derive(Debug, Clone, Default)]
pub struct Stores<
    U = InMemoryRepository<User>,
    R = InMemoryRepository<Role>,
    P = InMemoryRepository<Permission>,
> {
    pub users: U,
    pub roles: R,
    pub permissions: P,
}

impl Stores {
    /// In-memory stores holding the default roles and permissions
    pub fn seeded() -> Self {
        Self {
            users: InMemoryRepository::new(),
            roles: InMemoryRepository::with_entities(roles::seed()),
            permissions: InMemoryRepository::with_entities(permissions::seed()),
        }
    }
}

#[cfg(feature = "database")]
impl Stores<PgRepository<User>, PgRepository<Role>, PgRepository<Permission>> {
    /// Stores over one PostgreSQL pool
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: PgRepository::new(pool.clone()),
            roles: PgRepository::new(pool.clone()),
            permissions: PgRepository::new(pool),
        }
    }
}

/// Router for all three resources, with JSON fallbacks
pub fn app<U, R, P>(config: &Config, stores: Stores<U, R, P>) -> Router
where
    U: SoftDeleteRepository<User> + 'static,
    R: Repository<Role> + 'static,
    P: Repository<Permission> + 'static,
{
    let users = ResourceController::new(
        "/api/users",
        MessageNamespace::new("user"),
        CrudService::new(stores.users, UserHooks),
        UserTransformer,
    )
    .with_config(config);

    let roles = ResourceController::new(
        "/api/roles",
        MessageNamespace::new("role"),
        CrudService::new(stores.roles, RoleHooks),
        Identity,
    )
    .with_config(config);

    let permissions = ResourceController::new(
        "/api/permissions",
        MessageNamespace::new("permission"),
        CrudService::new(stores.permissions, PermissionHooks),
        Identity,
    )
    .with_config(config);

    with_fallbacks(
        Router::new()
            .merge(users.soft_delete_router())
            .merge(roles.router())
            .merge(permissions.router()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use users::UserStatus;

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

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn new_user(name: &str, email: &str) -> Value {
        json!({
            "name": name,
            "email": email,
            "password": "correct horse",
            "password_confirmation": "correct horse",
        })
    }

    fn user(name: &str, email: &str, status: UserStatus) -> User {
        let mut user = User::new(name, email);
        user.status = status;
        user
    }

    fn app_with_users() -> (Router, Stores) {
        let stores = Stores {
            users: InMemoryRepository::with_entities([
                user("Alice Smith", "alice@example.com", UserStatus::Active),
                user("Bob Jones", "bob@corp.test", UserStatus::Locked),
                user("Carol Smith", "carol@example.com", UserStatus::PendingVerification),
            ]),
            ..Stores::seeded()
        };
        (app(&Config::default(), stores.clone()), stores)
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let (app, stores) = app_with_users();
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/users", Some(new_user("Dana", "Dana@Example.com"))),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "user.created");
        assert_eq!(body["data"]["email"], "dana@example.com");
        assert_eq!(body["data"]["status"], "PENDING_VERIFICATION");
        assert_eq!(body["data"]["email_verified"], false);
        assert!(body["data"].get("password").is_none());
        assert_eq!(stores.users.len(), 4);

        let id = body["data"]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, request(Method::GET, &format!("/api/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Dana");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let (app, stores) = app_with_users();
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/users",
                Some(json!({
                    "name": "Dana",
                    "email": "dana",
                    "password": "correct horse",
                    "password_confirmation": "wrong horse",
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["code"], "VAL-4001");
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.email"]));
        assert_eq!(
            body["errors"]["field_errors"]["password_confirmation"],
            json!(["validation.confirmed"])
        );
        assert_eq!(stores.users.len(), 3);
    }

    #[tokio::test]
    async fn test_user_search_and_status_filter() {
        let (app, _) = app_with_users();

        let (_, body) = send(&app, request(Method::GET, "/api/users?q=smith&sort=name", None)).await;
        let names: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Alice Smith", "Carol Smith"]);
        assert!(body["data"][0].get("login_count").is_none());

        let (_, body) = send(&app, request(Method::GET, "/api/users/count?status=LOCKED", None)).await;
        assert_eq!(body["data"], 1);

        // login_count is not in the user allow-list
        let (_, body) = send(&app, request(Method::GET, "/api/users/count?login_count=5", None)).await;
        assert_eq!(body["data"], 3);
    }

    #[tokio::test]
    async fn test_user_status_update() {
        let (app, stores) = app_with_users();
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/users", Some(new_user("Erin", "erin@example.com"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(
                Method::PUT,
                &format!("/api/users/{id}"),
                Some(json!({"status": "ACTIVE"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "user.updated");
        assert_eq!(body["data"]["status"], "ACTIVE");
        assert_eq!(body["data"]["can_sign_in"], true);

        let (status, body) = send(
            &app,
            request(
                Method::PUT,
                &format!("/api/users/{id}"),
                Some(json!({"status": "RETIRED"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["code"], "REQ-4001");
        assert_eq!(stores.users.len(), 4);
    }

    #[tokio::test]
    async fn test_email_must_be_unique() {
        let (app, stores) = app_with_users();
        let (status, _) = send(
            &app,
            request(Method::POST, "/api/users", Some(new_user("Ann", "ann@example.com"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/users", Some(new_user("Ann Again", " ANN@example.com"))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["code"], "VAL-4001");
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.unique"]));
        assert_eq!(stores.users.len(), 4);

        let (_, body) = send(&app, request(Method::GET, "/api/users?q=ann@example.com", None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_change_to_taken_address_rejected() {
        let (app, stores) = app_with_users();
        let (_, body) = send(&app, request(Method::GET, "/api/users?q=bob", None)).await;
        let bob = body["data"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/users/{bob}");

        let (status, body) = send(
            &app,
            request(Method::PUT, &uri, Some(json!({"email": "Alice@Example.com"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["field_errors"]["email"], json!(["validation.unique"]));

        let (status, body) = send(
            &app,
            request(Method::PUT, &uri, Some(json!({"email": "BOB@corp.test", "name": "Robert Jones"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Robert Jones");

        let stored = stores.users.find_by_id(&bob.parse().unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.email, "bob@corp.test");
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_user_delete_is_soft_and_restorable() {
        let (app, stores) = app_with_users();
        let (_, body) = send(&app, request(Method::GET, "/api/users?q=carol", None)).await;
        let carol = body["data"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/users/{carol}");

        let (status, _) = send(&app, request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(stores.users.len(), 3);

        let (status, body) = send(&app, request(Method::GET, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-USR-0001");

        let (_, body) = send(&app, request(Method::GET, "/api/users/count?q=smith", None)).await;
        assert_eq!(body["data"], 1);

        let (status, body) = send(&app, request(Method::PUT, &uri, Some(json!({"name": "C"})))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "RES-USR-0001");

        let (status, body) =
            send(&app, request(Method::POST, &format!("{uri}/restore"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "user.restored");
        assert_eq!(body["data"]["name"], "Carol Smith");

        let (_, body) = send(&app, request(Method::GET, "/api/users/count?q=smith", None)).await;
        assert_eq!(body["data"], 2);
    }

    #[tokio::test]
    async fn test_not_found_codes_per_resource() {
        let (app, _) = app_with_users();
        let missing = uuid::Uuid::now_v7();

        for (path, code) in [
            ("users", "RES-USR-0001"),
            ("roles", "RES-ROL-0001"),
            ("permissions", "RES-PRM-0001"),
        ] {
            let (status, body) =
                send(&app, request(Method::GET, &format!("/api/{path}/{missing}"), None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(body["errors"]["code"], code, "{path}");

            let (status, body) =
                send(&app, request(Method::DELETE, &format!("/api/{path}/{missing}"), None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_eq!(body["errors"]["code"], code, "{path}");
        }
    }

    #[tokio::test]
    async fn test_roles_accept_any_schema_filter() {
        let (app, _) = app_with_users();

        let (_, body) = send(&app, request(Method::GET, "/api/roles?name=viewer", None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["name"], "viewer");

        // Search covers every text column, description included
        let (_, body) = send(&app, request(Method::GET, "/api/roles/count?q=access", None)).await;
        assert_eq!(body["data"], 1);

        // Unknown columns are dropped
        let (_, body) = send(&app, request(Method::GET, "/api/roles/count?colour=red", None)).await;
        assert_eq!(body["data"], 3);
    }

    #[tokio::test]
    async fn test_permissions_filter_by_guard_only() {
        let (app, _) = app_with_users();

        let (_, body) = send(&app, request(Method::GET, "/api/permissions/count?guard_name=api", None)).await;
        assert_eq!(body["data"], 1);

        let (_, body) = send(&app, request(Method::GET, "/api/permissions/count?name=users.read", None)).await;
        assert_eq!(body["data"], 5);
    }

    #[tokio::test]
    async fn test_role_lifecycle() {
        let (app, stores) = app_with_users();
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/roles", Some(json!({"name": "auditor"}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["guard_name"], "web");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, request(Method::DELETE, &format!("/api/roles/{id}"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        assert_eq!(stores.roles.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let (app, _) = app_with_users();

        let (status, body) = send(&app, request(Method::GET, "/api/groups", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"]["code"], "REQ-4041");

        let (status, body) = send(&app, request(Method::PATCH, "/api/users", None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["errors"]["code"], "REQ-4051");
    }

    #[cfg(feature = "database")]
    #[tokio::test]
    async fn test_postgres_stores_report_unreachable_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://identity@127.0.0.1:1/identity")
            .unwrap();
        let app = app(&Config::default(), Stores::postgres(pool));

        let (status, body) = send(&app, request(Method::GET, "/api/roles", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["errors"]["code"].is_string());
    }
}
