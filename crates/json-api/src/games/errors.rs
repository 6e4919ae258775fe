//! Game Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::games::GamesServiceError;

pub(crate) fn into_status_error(error: GamesServiceError) -> StatusError {
    match error {
        GamesServiceError::NotFound => StatusError::not_found().brief("Game not found"),
        GamesServiceError::AlreadyExists => StatusError::conflict().brief("Game already exists"),
        GamesServiceError::InvalidPrice
        | GamesServiceError::InvalidReference
        | GamesServiceError::MissingRequiredData
        | GamesServiceError::InvalidData => StatusError::bad_request().brief("Invalid game"),
        GamesServiceError::Sql(source) => {
            error!("game storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
