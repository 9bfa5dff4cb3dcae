pub mod health;
pub mod todos;
pub mod users;

use actix_web::{error, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus the extractor error handlers.
///
/// Expects `web::Data<dyn Store>`, `web::Data<AuthState>` and `web::Data<QuerySettings>`
/// to be registered on the `App`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(health::health)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(
                    web::scope("/users")
                        .service(users::login)
                        .service(users::register)
                        .service(users::list_users),
                )
                .service(
                    web::scope("/todos")
                        .service(todos::list_todos)
                        .service(todos::list_my_todos)
                        .service(todos::create_todo)
                        .service(todos::get_todo)
                        .service(todos::update_todo)
                        .service(todos::delete_todo),
                ),
        );
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

fn path_error(_err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest("Invalid todo id".into()).into()
}
