use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::recognition::domain::provider::{
    FaceMatch, IndexedFace, ProviderError, RecognitionProvider,
};
use crate::shared::config::Settings;
use crate::shared::face_box::FaceBox;

/// Blocking JSON client for the managed face recognition service.
///
/// Image payloads are base64-encoded in the request body. Service error
/// statuses map onto [`ProviderError`] kinds: 409 conflict for an
/// existing collection, 404 for a missing one, 400 for a rejected
/// collection name, anything else (including transport failures) to
/// `Unavailable`.
pub struct RestProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    region: String,
}

// --- wire types ---

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    face_match_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_image_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct DetectFacesResponse {
    #[serde(default)]
    faces: Vec<DetectedFace>,
}

#[derive(Deserialize)]
struct DetectedFace {
    bounding_box: FaceBox,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    face_matches: Vec<WireFaceMatch>,
}

#[derive(Deserialize)]
struct WireFaceMatch {
    similarity: f32,
    external_image_id: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    collection_id: &'a str,
}

#[derive(Deserialize)]
struct ListCollectionsResponse {
    #[serde(default)]
    collection_ids: Vec<String>,
}

#[derive(Deserialize)]
struct IndexFacesResponse {
    #[serde(default)]
    face_records: Vec<WireFaceRecord>,
}

#[derive(Deserialize)]
struct WireFaceRecord {
    face_id: String,
    external_image_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl RestProvider {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            region: settings.region.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// URL for one collection, with the name percent-encoded as a path
    /// segment so names with `/` or spaces cannot mangle the route.
    fn collection_url(&self, name: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ProviderError::Unavailable(format!("bad endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("endpoint cannot be a base URL".to_string()))?
            .extend(["v1", "collections", name]);
        Ok(url)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ProviderError> {
        let mut request = self.client.post(self.url(path)).json(body);
        request = request.header("x-region", &self.region);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        request
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }

    fn image_request<'a>(image: &[u8]) -> ImageRequest<'a> {
        ImageRequest {
            image: BASE64.encode(image),
            collection_id: None,
            face_match_threshold: None,
            external_image_id: None,
        }
    }

    fn check(response: Response, name: &str) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .map(|b| b.message)
            .unwrap_or_default();
        Err(match status {
            StatusCode::CONFLICT => ProviderError::AlreadyExists(name.to_string()),
            StatusCode::NOT_FOUND => ProviderError::NotFound(name.to_string()),
            StatusCode::BAD_REQUEST => ProviderError::InvalidName(if message.is_empty() {
                name.to_string()
            } else {
                message
            }),
            _ => ProviderError::Unavailable(format!("{status}: {message}")),
        })
    }

    fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ProviderError> {
        response
            .json::<T>()
            .map_err(|e| ProviderError::Unavailable(format!("malformed response: {e}")))
    }
}

impl RecognitionProvider for RestProvider {
    fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceBox>, ProviderError> {
        let response = self.post_json("/v1/detect-faces", &Self::image_request(image))?;
        let body: DetectFacesResponse = Self::parse(Self::check(response, "")?)?;
        Ok(body.faces.into_iter().map(|f| f.bounding_box).collect())
    }

    fn search_by_image(
        &self,
        image: &[u8],
        collection: &str,
        threshold: f32,
    ) -> Result<Vec<FaceMatch>, ProviderError> {
        let mut request = Self::image_request(image);
        request.collection_id = Some(collection);
        request.face_match_threshold = Some(threshold);
        let response = self.post_json("/v1/search-faces-by-image", &request)?;
        let body: SearchResponse = Self::parse(Self::check(response, collection)?)?;
        Ok(body
            .face_matches
            .into_iter()
            .map(|m| FaceMatch {
                person: m.external_image_id,
                similarity: m.similarity,
            })
            .collect())
    }

    fn create_collection(&self, name: &str) -> Result<(), ProviderError> {
        let response = self.post_json(
            "/v1/collections",
            &CreateCollectionRequest {
                collection_id: name,
            },
        )?;
        Self::check(response, name)?;
        Ok(())
    }

    fn delete_collection(&self, name: &str) -> Result<(), ProviderError> {
        let mut request = self.client.delete(self.collection_url(name)?);
        request = request.header("x-region", &self.region);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Self::check(response, name)?;
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>, ProviderError> {
        let mut request = self.client.get(self.url("/v1/collections"));
        request = request.header("x-region", &self.region);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let body: ListCollectionsResponse = Self::parse(Self::check(response, "")?)?;
        Ok(body.collection_ids)
    }

    fn index_face(
        &self,
        image: &[u8],
        collection: &str,
        person: &str,
    ) -> Result<Vec<IndexedFace>, ProviderError> {
        let mut request = Self::image_request(image);
        request.collection_id = Some(collection);
        request.external_image_id = Some(person);
        let response = self.post_json("/v1/index-faces", &request)?;
        let body: IndexFacesResponse = Self::parse(Self::check(response, collection)?)?;
        Ok(body
            .face_records
            .into_iter()
            .map(|r| IndexedFace {
                face_id: r.face_id,
                person: r.external_image_id,
            })
            .collect())
    }
}
