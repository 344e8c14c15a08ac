// crates/server/src/routes/meta.rs
//! Service metadata: endpoint index and the supported-language listing.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use docsmith_core::supported_languages;

/// GET / — human-facing index of the service's endpoints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "docsmith",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /api/generate",
            "status": "GET /api/status/{job_id}",
            "download": "GET /api/download/{job_id}",
            "jobs": "GET /api/jobs",
            "stream": "GET /api/jobs/stream",
            "cancel": "POST /api/jobs/{job_id}/cancel",
            "languages": "GET /api/languages",
            "health": "GET /health",
        },
    }))
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct LanguageInfo {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

/// GET /api/languages — language families the built-in parser recognizes,
/// with the file extensions mapped to each.
pub async fn languages() -> Json<LanguagesResponse> {
    let languages = supported_languages()
        .iter()
        .map(|(name, exts)| LanguageInfo {
            name: (*name).to_string(),
            extensions: exts.iter().map(|e| (*e).to_string()).collect(),
        })
        .collect();
    Json(LanguagesResponse { languages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let Json(body) = index().await;
        assert_eq!(body["service"], "docsmith");
        assert_eq!(body["endpoints"]["generate"], "POST /api/generate");
        assert_eq!(body["endpoints"]["languages"], "GET /api/languages");
    }

    #[tokio::test]
    async fn test_languages_lists_known_families() {
        let Json(body) = languages().await;
        assert!(!body.languages.is_empty());
        let rust = body
            .languages
            .iter()
            .find(|l| l.name == "rust")
            .expect("rust listed");
        assert!(rust.extensions.contains(&"rs".to_string()));
    }
}
