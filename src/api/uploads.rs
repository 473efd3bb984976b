use crate::api::client::{decode, ApiRequest, Method, Transport, Upload};
use crate::api::error::ApiError;
use crate::api::types::UploadResponse;

/// Upload an image and return its public URL.
pub async fn upload_image(t: &dyn Transport, upload: Upload) -> Result<String, ApiError> {
  let request = ApiRequest::new(Method::Post, "/uploads/image").multipart(upload);
  let response: UploadResponse = decode(t.send(request).await?)?;
  Ok(response.url)
}
