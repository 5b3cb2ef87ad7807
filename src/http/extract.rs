//! Request extractors: JSON bodies with JSON error replies, the admin session
//! gate, and product forms that arrive as multipart or JSON.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};

use super::error::ApiError;
use super::AppState;
use crate::auth::SessionClaims;
use crate::uploads::ImageUpload;

pub const SESSION_COOKIE: &str = "token";

/// `Json<T>` whose rejection renders as an `InvalidRequest` message.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::InvalidRequest(rejection.body_text())),
        }
    }
}

/// Session token from the `token` cookie, falling back to a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Proof that the request carries a valid admin session.
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthenticated("Not logged in".into()))?;
        let claims = state.auth.verify(&token)?;
        Ok(Self(claims))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Int(i64),
    Text(String),
}

fn parse_int(raw: &str) -> Result<Option<i64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("expected an integer, got {:?}", raw))
}

/// Integers that may arrive as JSON numbers or numeric strings.
pub fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Lenient>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Int(n)) => Ok(Some(n)),
        Some(Lenient::Text(raw)) => parse_int(&raw).map_err(de::Error::custom),
    }
}

/// Product fields as submitted. Everything is optional here; create and
/// update decide what is required.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFields {
    #[serde(default, alias = "nama")]
    pub name: Option<String>,
    #[serde(default, alias = "kategori")]
    pub category: Option<String>,
    #[serde(default, alias = "harga", deserialize_with = "lenient_int")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub stock: Option<i64>,
    #[serde(default, alias = "deskripsi")]
    pub description: Option<String>,
}

impl ProductFields {
    fn set_text(&mut self, field: &str, text: String) -> Result<(), ApiError> {
        let number = |text: &str| {
            parse_int(text).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", field, e)))
        };
        match field {
            "name" | "nama" => self.name = Some(text),
            "category" | "kategori" => self.category = Some(text),
            "price" | "harga" => self.price = number(&text)?,
            "stock" => self.stock = number(&text)?,
            "description" | "deskripsi" => self.description = Some(text),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: ProductFields,
    pub image: Option<ImageUpload>,
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

#[async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let JsonBody(fields) = JsonBody::<ProductFields>::from_request(req, state).await?;
            return Ok(Self { fields, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" || name == "gambar" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
                // An empty file input still submits a part.
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
                form.fields.set_text(&name, text)?;
            }
        }
        Ok(form)
    }
}
