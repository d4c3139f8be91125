//! Route definitions for email conversion.
//!
//! ```text
//! POST /converter        convert_email   (multipart, field `file`)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::converter;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/converter", post(converter::convert_email))
}
