//! User resource handlers
//!
//! ## Endpoints
//!
//! - `GET /users` - List users
//! - `GET /users/new` - Empty creation form
//! - `GET /users/{id}` - User detail
//! - `POST /users` - Create user, redirect to /users
//! - `GET /users/{id}/edit` - Edit form with current values
//! - `PUT|PATCH /users/{id}` - Update user, redirect to /users
//! - `DELETE /users/{id}` - Remove user, redirect to /users
//!
//! GET endpoints serialize a named view (title + payload) as JSON; mutating
//! endpoints issue a 303 back to the listing. Handlers return a typed error
//! which the dispatch layer translates to an HTTP response.

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::UserDoc;
use crate::server::AppState;
use crate::types::{Result, RosterError};

type FullBody = Full<Bytes>;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Form body for create and update
#[derive(Debug, Deserialize, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
}

/// User payload rendered into views
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

/// Listing view: `users/index`
#[derive(Debug, Serialize)]
pub struct UserListView {
    pub view: &'static str,
    pub title: &'static str,
    pub users: Vec<UserView>,
}

/// Detail view: `users/user`
#[derive(Debug, Serialize)]
pub struct UserDetailView {
    pub view: &'static str,
    pub title: &'static str,
    pub user: UserView,
}

/// Form view: `users/new` and `users/edit`
#[derive(Debug, Serialize)]
pub struct UserFormView {
    pub view: &'static str,
    pub title: &'static str,
    #[serde(rename = "btnMsg")]
    pub btn_msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
}

fn user_to_view(user: &UserDoc) -> UserView {
    UserView {
        id: user.id.map(|o| o.to_hex()).unwrap_or_default(),
        name: user.name.clone(),
        email: user.email.clone(),
        created_on: user.created_on.to_string(),
        modified_on: user.modified_on.map(|d| d.to_string()),
        last_login: user.last_login.map(|d| d.to_string()),
    }
}

// =============================================================================
// Parsing Helpers
// =============================================================================

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| RosterError::BadRequest(format!("invalid user id '{}'", id)))
}

/// Parse a submitted form body by content type. JSON bodies are accepted for
/// API clients, everything else is treated as an HTML form submission.
/// Field presence is the only validation performed.
pub fn parse_user_form(content_type: Option<&str>, body: &[u8]) -> Result<UserForm> {
    let is_json = content_type
        .map(|c| c.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_slice(body)
            .map_err(|e| RosterError::BadRequest(format!("invalid JSON body: {}", e)))
    } else {
        serde_urlencoded::from_bytes(body)
            .map_err(|e| RosterError::BadRequest(format!("invalid form body: {}", e)))
    }
}

async fn read_user_form(req: Request<Incoming>) -> Result<UserForm> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| RosterError::BadRequest(format!("failed to read body: {}", e)))?
        .to_bytes();

    parse_user_form(content_type.as_deref(), &body)
}

// =============================================================================
// Response Helpers
// =============================================================================

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

/// 303 back to the listing view after a successful mutation
pub fn redirect_to_users() -> Response<FullBody> {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header("Location", "/users")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

// =============================================================================
// Route Table
// =============================================================================

/// Operation selected by the route table for a /users request
#[derive(Debug, PartialEq)]
enum UserOp {
    List,
    NewForm,
    Create,
    Show(String),
    EditForm(String),
    Update(String),
    Destroy(String),
}

/// Map method + subpath (everything after "/users") to an operation.
/// The "/new" arm must stay ahead of the id arms: "new" is a valid single
/// segment, so a reordering would send GET /users/new into the id path.
fn route(method: &Method, subpath: &str) -> Option<UserOp> {
    match (method, subpath) {
        // GET /users - list all users
        (&Method::GET, "") | (&Method::GET, "/") => Some(UserOp::List),

        // GET /users/new - empty creation form
        (&Method::GET, "/new") => Some(UserOp::NewForm),

        // POST /users - create a user
        (&Method::POST, "") | (&Method::POST, "/") => Some(UserOp::Create),

        // GET /users/{id}/edit - pre-populated edit form
        (&Method::GET, p) if p.ends_with("/edit") => {
            let id = p.strip_prefix('/').and_then(|s| s.strip_suffix("/edit"))?;
            if id.is_empty() || id.contains('/') {
                return None;
            }
            Some(UserOp::EditForm(id.to_string()))
        }

        // GET /users/{id} - user detail
        (&Method::GET, p) if is_id_segment(p) => {
            Some(UserOp::Show(p.trim_start_matches('/').to_string()))
        }

        // PUT/PATCH /users/{id} - update name, email, modifiedOn
        (&Method::PUT, p) | (&Method::PATCH, p) if is_id_segment(p) => {
            Some(UserOp::Update(p.trim_start_matches('/').to_string()))
        }

        // DELETE /users/{id} - remove the user
        (&Method::DELETE, p) if is_id_segment(p) => {
            Some(UserOp::Destroy(p.trim_start_matches('/').to_string()))
        }

        _ => None,
    }
}

/// A subpath of the form "/{id}" with exactly one non-empty segment
fn is_id_segment(subpath: &str) -> bool {
    match subpath.strip_prefix('/') {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /users/* routes
pub async fn handle_users_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Result<Response<FullBody>> {
    let subpath = path.strip_prefix("/users").unwrap_or("").to_string();

    let op = route(req.method(), &subpath)
        .ok_or_else(|| RosterError::NotFound(format!("no route for {}", path)))?;

    match op {
        UserOp::List => handle_list(state).await,
        UserOp::NewForm => Ok(handle_new_form()),
        UserOp::Create => handle_create(req, state).await,
        UserOp::Show(id) => handle_show(state, &id).await,
        UserOp::EditForm(id) => handle_edit_form(state, &id).await,
        UserOp::Update(id) => handle_update(req, state, &id).await,
        UserOp::Destroy(id) => handle_destroy(state, &id).await,
    }
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

async fn handle_list(state: Arc<AppState>) -> Result<Response<FullBody>> {
    let users = state.users.list().await?;

    info!("Listing {} user(s)", users.len());

    Ok(json_response(
        StatusCode::OK,
        &UserListView {
            view: "users/index",
            title: "Users List",
            users: users.iter().map(user_to_view).collect(),
        },
    ))
}

fn handle_new_form() -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &UserFormView {
            view: "users/new",
            title: "New User",
            btn_msg: "Create",
            user: None,
        },
    )
}

async fn handle_show(state: Arc<AppState>, id: &str) -> Result<Response<FullBody>> {
    let oid = parse_object_id(id)?;
    let user = state.users.get(oid).await?;

    info!("Showing user '{}'", user.name);

    Ok(json_response(
        StatusCode::OK,
        &UserDetailView {
            view: "users/user",
            title: "User Profile",
            user: user_to_view(&user),
        },
    ))
}

async fn handle_create(req: Request<Incoming>, state: Arc<AppState>) -> Result<Response<FullBody>> {
    let form = read_user_form(req).await?;
    state.users.create(form.name, form.email).await?;
    Ok(redirect_to_users())
}

async fn handle_edit_form(state: Arc<AppState>, id: &str) -> Result<Response<FullBody>> {
    let oid = parse_object_id(id)?;
    let user = state.users.get(oid).await?;

    Ok(json_response(
        StatusCode::OK,
        &UserFormView {
            view: "users/edit",
            title: "Edit User",
            btn_msg: "Update",
            user: Some(user_to_view(&user)),
        },
    ))
}

async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<FullBody>> {
    let oid = parse_object_id(id)?;
    let form = read_user_form(req).await?;
    state.users.update(oid, form.name, form.email).await?;
    Ok(redirect_to_users())
}

async fn handle_destroy(state: Arc<AppState>, id: &str) -> Result<Response<FullBody>> {
    let oid = parse_object_id(id)?;
    state.users.remove(oid).await?;
    Ok(redirect_to_users())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_urlencoded() {
        let form = parse_user_form(
            Some("application/x-www-form-urlencoded"),
            b"name=Ann&email=ann%40x.com",
        )
        .unwrap();
        assert_eq!(
            form,
            UserForm {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string()
            }
        );
    }

    #[test]
    fn test_parse_form_json() {
        let form = parse_user_form(
            Some("application/json"),
            br#"{"name":"Ann","email":"ann@x.com"}"#,
        )
        .unwrap();
        assert_eq!(form.name, "Ann");
        assert_eq!(form.email, "ann@x.com");
    }

    #[test]
    fn test_parse_form_defaults_to_urlencoded() {
        let form = parse_user_form(None, b"name=Ann&email=ann%40x.com").unwrap();
        assert_eq!(form.email, "ann@x.com");
    }

    #[test]
    fn test_parse_form_missing_field_is_bad_request() {
        let err = parse_user_form(Some("application/json"), br#"{"name":"Ann"}"#).unwrap_err();
        assert!(matches!(err, RosterError::BadRequest(_)));

        let err = parse_user_form(None, b"name=Ann").unwrap_err();
        assert!(matches!(err, RosterError::BadRequest(_)));
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(matches!(
            parse_object_id("not-an-id").unwrap_err(),
            RosterError::BadRequest(_)
        ));
        assert!(parse_object_id(&ObjectId::new().to_hex()).is_ok());
    }

    #[test]
    fn test_id_segment_matching() {
        assert!(is_id_segment("/507f1f77bcf86cd799439011"));
        assert!(!is_id_segment(""));
        assert!(!is_id_segment("/"));
        assert!(!is_id_segment("/abc/def"));
    }

    #[test]
    fn test_route_table_collection_paths() {
        assert_eq!(route(&Method::GET, ""), Some(UserOp::List));
        assert_eq!(route(&Method::GET, "/"), Some(UserOp::List));
        assert_eq!(route(&Method::POST, ""), Some(UserOp::Create));
        assert_eq!(route(&Method::POST, "/"), Some(UserOp::Create));
        assert_eq!(route(&Method::GET, "/new"), Some(UserOp::NewForm));
    }

    #[test]
    fn test_route_table_id_paths() {
        let id = ObjectId::new().to_hex();

        assert_eq!(
            route(&Method::GET, &format!("/{}", id)),
            Some(UserOp::Show(id.clone()))
        );
        assert_eq!(
            route(&Method::GET, &format!("/{}/edit", id)),
            Some(UserOp::EditForm(id.clone()))
        );
        assert_eq!(
            route(&Method::PUT, &format!("/{}", id)),
            Some(UserOp::Update(id.clone()))
        );
        assert_eq!(
            route(&Method::PATCH, &format!("/{}", id)),
            Some(UserOp::Update(id.clone()))
        );
        assert_eq!(
            route(&Method::DELETE, &format!("/{}", id)),
            Some(UserOp::Destroy(id))
        );
    }

    #[test]
    fn test_route_new_form_wins_over_id_segment() {
        // "new" is itself a single segment, so the form route must take
        // precedence over detail lookup regardless of arm ordering bugs
        assert!(is_id_segment("/new"));
        assert_eq!(route(&Method::GET, "/new"), Some(UserOp::NewForm));
        assert_ne!(route(&Method::GET, "/new"), Some(UserOp::Show("new".to_string())));
    }

    #[test]
    fn test_route_rejects_mismatched_method_and_path() {
        // Mutations need an id
        assert_eq!(route(&Method::PUT, ""), None);
        assert_eq!(route(&Method::PATCH, "/"), None);
        assert_eq!(route(&Method::DELETE, ""), None);

        // Create is collection-level only
        let id = ObjectId::new().to_hex();
        assert_eq!(route(&Method::POST, &format!("/{}", id)), None);

        // Extra segments match nothing
        assert_eq!(route(&Method::GET, "/a/b"), None);
        assert_eq!(route(&Method::GET, "//edit"), None);
        assert_eq!(route(&Method::GET, "/a/b/edit"), None);
        assert_eq!(route(&Method::PUT, &format!("/{}/edit", id)), None);
    }

    #[test]
    fn test_redirect_points_at_listing() {
        let resp = redirect_to_users();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("Location").unwrap(), "/users");
    }

    #[test]
    fn test_form_view_serialization() {
        let view = UserFormView {
            view: "users/new",
            title: "New User",
            btn_msg: "Create",
            user: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "New User");
        assert_eq!(json["btnMsg"], "Create");
        assert!(json.get("user").is_none());
    }

    #[test]
    fn test_user_view_from_doc() {
        let mut doc = UserDoc::new("Ann".to_string(), "ann@x.com".to_string());
        doc.id = Some(ObjectId::new());
        doc.last_login = None;

        let view = user_to_view(&doc);
        assert_eq!(view.name, "Ann");
        assert_eq!(view.id.len(), 24);
        assert!(view.modified_on.is_some());
        assert!(view.last_login.is_none());
    }
}
