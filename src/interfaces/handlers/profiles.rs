use actix_multipart::form::MultipartForm;
use actix_web::{web, Either, HttpResponse};

use crate::{
    entities::{
        image::ImageUpload,
        profile::{ProfileInput, ProfileUpload, ReloadResponse},
    },
    errors::AppError,
    filter::FilterCriteria,
    AppState,
};

type ProfileSubmission = Result<Either<MultipartForm<ProfileUpload>, web::Json<ProfileInput>>, actix_web::Error>;

pub async fn list_profiles(
    state: web::Data<AppState>,
    criteria: web::Query<FilterCriteria>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.profile_handler.list_profiles(&criteria))
}

pub async fn get_facets(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.profile_handler.facets())
}

pub async fn get_profile(
    state: web::Data<AppState>,
    profile_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let profile = state.profile_handler.get_profile(&profile_id)?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn create_profile(
    state: web::Data<AppState>,
    data_input: ProfileSubmission,
) -> Result<HttpResponse, AppError> {
    let (input, image) = read_submission(data_input)?;

    let profile = state.profile_handler.create_profile(input, image).await?;
    Ok(HttpResponse::Created().json(profile))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    profile_id: web::Path<String>,
    data_input: ProfileSubmission,
) -> Result<HttpResponse, AppError> {
    let (input, image) = read_submission(data_input)?;

    let profile = state.profile_handler.update_profile(&profile_id, input, image).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn delete_profile(
    state: web::Data<AppState>,
    profile_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.profile_handler.delete_profile(&profile_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn reload_profiles(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let loaded = state.profile_handler.load_profiles().await?;
    Ok(HttpResponse::Ok().json(ReloadResponse { loaded }))
}

/// Unpacks either a JSON body or a multipart form into fields plus optional image.
fn read_submission(data_input: ProfileSubmission) -> Result<(ProfileInput, Option<ImageUpload>), AppError> {
    let either = data_input.map_err(|e| {
        AppError::BadRequest(format!(
            "Request must be either application/json or multipart/form-data: {}",
            e
        ))
    })?;

    match either {
        Either::Left(form) => {
            let form = form.into_inner();

            // An untouched file input still sends an empty, unnamed part
            let image = form.image
                .filter(|file| !(file.data.is_empty() && file.file_name.as_deref().unwrap_or("").is_empty()))
                .map(|file| {
                    ImageUpload::new(
                        file.file_name.unwrap_or_else(|| "image".to_string()),
                        file.content_type.map(|mime| mime.to_string()).unwrap_or_default(),
                        file.data.to_vec(),
                    )
                });

            Ok((form.profile.0, image))
        }
        Either::Right(json) => Ok((json.into_inner(), None)),
    }
}
