/// API success envelope
///
/// Every successful response carries the same shape:
/// `{success: true, statusCode, message, data?}`.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiBody<T: Serialize> {
    success: bool,
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

fn send<T: Serialize>(status_code: u16, message: &str, data: Option<T>) -> ApiBody<T> {
    ApiBody {
        success: status_code < 400,
        status_code,
        message: message.to_string(),
        data,
    }
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(send(200, message, Some(data)))
}

pub fn ok_empty(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(send::<()>(200, message, None))
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(send(201, message, Some(data)))
}

pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
