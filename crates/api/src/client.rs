//! GalleryDesk API client.
//!
//! Async HTTP client using `reqwest`. Every method maps to one backend
//! endpoint; paths come from [`Endpoint`].

use std::time::Duration;

use chrono::NaiveDate;
use gallerydesk_protocol::constants::SCHEDULE_DATE_FORMAT;
use gallerydesk_protocol::messages::{
    CheckItemRequest, CheckItemResponse, CreateGalleryRequest, CreateGalleryResponse,
    GalleryInfoRequest, GetInfoRequest, GetInfoResponse, ReadCookiesResponse,
    SaveEventDetailRequest, SaveEventDetailResponse, SaveEventRequest, SaveEventResponse,
    SaveLoginDataRequest, SaveLoginDataResponse, SearchGalleryRequest,
};
use gallerydesk_protocol::{Endpoint, GallerySearchHit, GalleryInfo, Game, GameEvent, ScheduledGame};
use gallerydesk_transfer::ChunkDescriptor;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Per-request timeout. A 10 MiB chunk on a slow uplink needs minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors from the API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Error {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) | Self::InvalidBaseUrl(_) => None,
        }
    }
}

/// GalleryDesk API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(endpoint);
        trace!(%url, "GET");
        let resp = self.http.get(&url).query(params).send().await?;
        read_json(resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(endpoint);
        trace!(%url, "POST");
        let resp = self.http.post(&url).json(body).send().await?;
        read_json(resp).await
    }

    /// Lists the schedulable events offered by the upload picker.
    pub async fn list_events(&self) -> Result<Vec<GameEvent>, Error> {
        self.get(Endpoint::Events, &[]).await
    }

    /// Number of items currently in the container linked to `event_id`.
    pub async fn container_item_count(&self, event_id: &str) -> Result<u64, Error> {
        let req = GetInfoRequest {
            event_id: event_id.to_string(),
        };
        let resp: GetInfoResponse = self.post(Endpoint::GetInfo, &req).await?;
        Ok(resp.item_count())
    }

    /// Sends one chunk as a multipart form. Any 2xx response means accepted.
    pub async fn upload_chunk(&self, chunk: &ChunkDescriptor) -> Result<(), Error> {
        let mut form = Form::new();
        for (name, value) in chunk.form_fields() {
            form = form.text(name, value);
        }
        let file = Part::stream_with_length(chunk.payload.clone(), chunk.payload.len() as u64)
            .file_name(chunk.raw_name.clone())
            .mime_str("application/octet-stream")?;
        form = form.part(gallerydesk_protocol::constants::fields::FILE, file);

        debug!(
            identifier = %chunk.file_identifier,
            chunk = chunk.chunk_index,
            of = chunk.total_chunks,
            bytes = chunk.chunk_actual_size,
            "uploading chunk"
        );

        let resp = self
            .http
            .post(self.url(Endpoint::Upload))
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, Error> {
        self.get(Endpoint::ListGames, &[]).await
    }

    pub async fn search_galleries(
        &self,
        game_id: &str,
        keyword: &str,
    ) -> Result<Vec<GallerySearchHit>, Error> {
        let req = SearchGalleryRequest {
            game_id: game_id.to_string(),
            search_keyword: keyword.to_string(),
        };
        self.post(Endpoint::SearchGallery, &req).await
    }

    pub async fn gallery_info(&self, game_id: &str, gallery_name: &str) -> Result<GalleryInfo, Error> {
        let req = GalleryInfoRequest {
            game_id: game_id.to_string(),
            gallery_name: gallery_name.to_string(),
        };
        self.post(Endpoint::GalleryInfo, &req).await
    }

    /// Creates a gallery and returns its id.
    pub async fn create_gallery(&self, req: &CreateGalleryRequest) -> Result<String, Error> {
        let resp: CreateGalleryResponse = self.post(Endpoint::CreateGallery, req).await?;
        Ok(resp.result.gallery_id)
    }

    /// Looks up which events already reference the given item lines.
    pub async fn check_items(
        &self,
        game_id: &str,
        lines: Vec<String>,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let req = CheckItemRequest {
            game_id: game_id.to_string(),
            check_data: lines,
        };
        let resp: CheckItemResponse = self.post(Endpoint::CheckItem, &req).await?;
        Ok(resp.result_data)
    }

    /// Stores the admin session cookie on the backend. Returns the backend's verdict.
    pub async fn save_login_data(&self, cookie: &str) -> Result<bool, Error> {
        let req = SaveLoginDataRequest {
            datas: cookie.to_string(),
        };
        let resp: SaveLoginDataResponse = self.post(Endpoint::SaveLoginData, &req).await?;
        Ok(resp.success)
    }

    pub async fn read_login_cookie(&self) -> Result<Option<String>, Error> {
        let resp: ReadCookiesResponse = self.get(Endpoint::ReadCookies, &[]).await?;
        Ok(resp.result)
    }

    /// Game sections of the schedule page for one day.
    pub async fn scheduled_games(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>, Error> {
        let date = date.format(SCHEDULE_DATE_FORMAT).to_string();
        self.get(Endpoint::Games, &[("date", date)]).await
    }

    /// Creates or updates a schedulable event. Returns its id.
    pub async fn save_event(&self, req: &SaveEventRequest) -> Result<String, Error> {
        let resp: SaveEventResponse = self.post(Endpoint::SaveEvent, req).await?;
        Ok(resp.last_id)
    }

    pub async fn save_event_detail(
        &self,
        req: &SaveEventDetailRequest,
    ) -> Result<SaveEventDetailResponse, Error> {
        self.post(Endpoint::SaveEventDetail, req).await
    }
}

/// Checks the status and decodes a JSON body.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallerydesk_transfer::{ChunkSplitter, FileEntry, FileSource};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Starts a one-shot HTTP server answering with `status` and `body`.
    ///
    /// The handle resolves to the raw request it received.
    async fn mock_server(status: u16, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let Ok((mut stream, _)) = listener.accept().await else {
                return String::new();
            };
            let request = read_request(&mut stream).await;

            let resp = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
            request
        });

        (url, handle)
    }

    /// Reads headers plus `Content-Length` bytes of body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    #[tokio::test]
    async fn list_events_parses_picker_rows() {
        let json = r#"[
            {"id": 1, "name": "Cup", "g_name": "Finals", "gameName": "Racing", "gallery_id": 55, "post_slug": "cup"},
            {"id": 2, "name": "Open", "gameName": "Puzzle", "gallery_id": null}
        ]"#;
        let (url, handle) = mock_server(200, json).await;

        let client = Client::new(&url).unwrap();
        let events = client.list_events().await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].gallery_id.as_deref(), Some("55"));
        assert!(events[1].gallery_id.is_none());

        let request = handle.await.unwrap();
        assert!(request.starts_with("GET /events "), "{request}");
    }

    #[tokio::test]
    async fn item_count_counts_gallery_entries() {
        let json = r#"{"result": {"gallery": [{"id": 1}, {"id": 2}, {"id": 3}]}}"#;
        let (url, handle) = mock_server(200, json).await;

        let client = Client::new(&url).unwrap();
        assert_eq!(client.container_item_count("77").await.unwrap(), 3);

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /getInfo "));
        assert!(request.contains(r#"{"event_id":"77"}"#), "{request}");
    }

    #[tokio::test]
    async fn upload_chunk_sends_multipart_fields() {
        let (url, handle) = mock_server(200, "{}").await;
        let entry = FileEntry::new(FileSource::new("photo (2).jpg", b"JPEGDATA".to_vec()));
        let chunks = ChunkSplitter::new(5).split_with_stamp(&entry, 1, 10, "77", 99);

        let client = Client::new(&url).unwrap();
        client.upload_chunk(&chunks[1]).await.unwrap();

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /upload "));
        assert!(request.contains("multipart/form-data"));
        for (name, value) in [
            ("flowChunkNumber", "2"),
            ("flowCurrentChunkSize", "3"),
            ("flowIdentifier", "8-photo2jpg-99"),
            ("relate", "gallery_version"),
            ("order_index", "11"),
            ("customFilename", "photo"),
            ("isLastChunk", "true"),
        ] {
            let field = format!("name=\"{name}\"\r\n\r\n{value}\r\n");
            assert!(request.contains(&field), "missing {name}: {request}");
        }
        assert!(request.contains("name=\"file\"; filename"));
        assert!(request.contains("\r\n\r\nATA\r\n"));
    }

    #[tokio::test]
    async fn upload_chunk_reports_status() {
        let (url, handle) = mock_server(502, r#"{"error":"bad gateway"}"#).await;
        let entry = FileEntry::new(FileSource::new("a.jpg", vec![1u8; 4]));
        let chunks = ChunkSplitter::new(4).split(&entry, 0, 1, "1");

        let client = Client::new(&url).unwrap();
        let err = client.upload_chunk(&chunks[0]).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("bad gateway"));
        handle.abort();
    }

    #[tokio::test]
    async fn search_galleries_posts_keyword() {
        let json = r#"[{"title": "Cup - Gallery", "href": "/g/1", "sub": "Cup Finals"}]"#;
        let (url, handle) = mock_server(200, json).await;

        let client = Client::new(&url).unwrap();
        let hits = client.search_galleries("3", "cup").await.unwrap();

        assert_eq!(hits[0].short_title(), "Cup");
        let request = handle.await.unwrap();
        assert!(request.contains(r#""gameId":"3""#));
        assert!(request.contains(r#""search_keyword":"cup""#));
    }

    #[tokio::test]
    async fn create_gallery_returns_id() {
        let (url, handle) = mock_server(200, r#"{"result": {"gallery_id": 812}}"#).await;

        let client = Client::new(&url).unwrap();
        let req = CreateGalleryRequest {
            game_id: "3".into(),
            gallery_name: "Spring".into(),
            is_content: true,
            public_date: "2024/05/01".into(),
        };
        assert_eq!(client.create_gallery(&req).await.unwrap(), "812");

        let request = handle.await.unwrap();
        assert!(request.contains(r#""IsContent":true"#));
        assert!(request.contains(r#""publicDate":"2024/05/01""#));
    }

    #[tokio::test]
    async fn scheduled_games_formats_date() {
        let (url, handle) = mock_server(200, "[]").await;

        let client = Client::new(&url).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(client.scheduled_games(date).await.unwrap().is_empty());

        let request = handle.await.unwrap();
        assert!(
            request.starts_with("GET /games?date=2024%2F03%2F09 "),
            "{request}"
        );
    }

    #[tokio::test]
    async fn read_login_cookie_missing() {
        let (url, handle) = mock_server(200, "{}").await;
        let client = Client::new(&url).unwrap();
        assert_eq!(client.read_login_cookie().await.unwrap(), None);
        handle.abort();
    }

    #[tokio::test]
    async fn api_error_mentions_status() {
        let (url, handle) = mock_server(401, r#"{"error":"Unauthorized"}"#).await;

        let client = Client::new(&url).unwrap();
        let err = client.list_games().await.unwrap_err();
        let err_msg = err.to_string();
        assert!(err_msg.contains("401"), "error should mention 401: {err_msg}");
        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_server_has_no_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = Client::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.list_events().await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn base_url_is_validated_and_normalized() {
        assert!(matches!(
            Client::new("localhost:3000"),
            Err(Error::InvalidBaseUrl(_))
        ));
        let client = Client::new(" http://localhost:3000/api/ ").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url(Endpoint::Upload), "http://localhost:3000/api/upload");
    }
}
