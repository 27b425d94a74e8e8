#![allow(dead_code)]

use chat_service::config::{
    ChatConfig, GeminiSettings, ModelSettings, UploadSettings, DEFAULT_MAX_UPLOAD_BYTES,
};
use chat_service::services::providers::{GenerativeProvider, MockProvider};
use chat_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const MOCK_REPLY: &str = "This is the model's answer.";

pub fn test_config(upload_dir: &Path) -> ChatConfig {
    ChatConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "debug".to_string(),
        },
        gemini: GeminiSettings {
            api_key: Secret::new("test-api-key".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            models: ModelSettings::default(),
            timeout: Duration::from_secs(5),
        },
        uploads: UploadSettings {
            folder: upload_dir.to_path_buf(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        },
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
    }
}

pub struct TestApp {
    pub address: String,
    pub provider: Arc<MockProvider>,
    pub upload_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MockProvider::replying(MOCK_REPLY), |_| {}).await
    }

    pub async fn spawn_with(
        provider: MockProvider,
        configure: impl FnOnce(&mut ChatConfig),
    ) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let mut config = test_config(upload_dir.path());
        configure(&mut config);

        let provider = Arc::new(provider);
        let app = Application::build_with_provider(
            config,
            provider.clone() as Arc<dyn GenerativeProvider>,
        )
        .await
        .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            provider,
            upload_dir,
            client,
        }
    }

    pub async fn post_json(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/chat", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Filenames are sent raw so sanitisation is exercised server-side.
    pub async fn post_multipart(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/chat", self.address))
            .multipart(form.percent_encode_noop())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        self.post_multipart(reqwest::multipart::Form::new().part("file", part))
            .await
    }

    /// Files left behind in the scratch directory.
    pub fn scratch_files(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir.path())
            .expect("upload dir should exist")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

pub async fn error_of(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    body["error"]
        .as_str()
        .expect("error field should be a string")
        .to_string()
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 200, 30, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    buf
}

/// Minimal PDF with one Helvetica text line per page. Empty strings make
/// pages with no text.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    // 1: catalog, 2: page tree, 3: font, then a (page, contents) pair per page
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 18 Tf 72 720 Td ({}) Tj ET", text)
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}
