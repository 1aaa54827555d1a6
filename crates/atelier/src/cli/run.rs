//! Command handlers and process wiring.

use std::path::Path;
use std::sync::Arc;

use atelier::{
    AtelierConfig, AtelierError, AtelierErrorKind, AtelierResult, CredentialProvider, EnvCredentials,
    GeminiRestClient, IoError, JsonError, LatLng, RequestManager, Stylist, TrafficClass,
    Wardrobe, decode_base64, encode_base64,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use super::Commands;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// The wired-up application.
///
/// Holds the one request lane of the process, shared by every stylist call.
#[derive(Debug)]
pub struct App {
    stylist: Stylist,
}

impl App {
    /// Load configuration and wire the stylist to the Gemini REST API.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client cannot
    /// be built.
    pub fn load() -> AtelierResult<Self> {
        let config = AtelierConfig::load()?;
        Self::from_config(config)
    }

    /// Wire the stylist from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: AtelierConfig) -> AtelierResult<Self> {
        let lane = RequestManager::new(&config.throttle);
        let backend = GeminiRestClient::new()?;
        let credentials = EnvCredentials::new();
        if !credentials.has_selected_key() {
            info!("No API key selected yet; set GEMINI_API_KEY");
        }

        Ok(Self {
            stylist: Stylist::new(
                Arc::new(backend),
                Arc::new(credentials),
                lane,
                config.models,
            ),
        })
    }

    /// Run one command to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error the command hits.
    #[instrument(skip(self))]
    pub async fn execute(&self, command: Commands) -> AtelierResult<()> {
        match command {
            Commands::Status => {
                for class in [TrafficClass::HighCapability, TrafficClass::Fast] {
                    match self.stylist.lane().wait_seconds(class) {
                        0 => println!("{class}: ready"),
                        secs => println!("{class}: next call in {secs}s"),
                    }
                }
            }

            Commands::Ask { prompt, deep } => {
                let answer = if deep {
                    self.stylist.ask_stylist_deep(&prompt).await?
                } else {
                    self.stylist.fast_analyze(&prompt).await?
                };
                println!("{answer}");
            }

            Commands::Analyze { image, separate } => {
                let image = encode_base64(&read_file(&image)?);
                if separate {
                    let items = self.stylist.separate_clothing_items(&image).await?;
                    // The source photo is attached to every item; leave it out.
                    let tags: Vec<_> = items.into_iter().map(|item| item.tags).collect();
                    print_json(&tags)?;
                } else {
                    print_json(&self.stylist.analyze_clothing_image(&image).await?)?;
                }
            }

            Commands::Suggest { wardrobe, prompt } => {
                let wardrobe = load_wardrobe(&wardrobe)?;
                let outfits = self.stylist.suggest_outfits(&wardrobe, &prompt).await?;
                for (n, ids) in outfits.iter().enumerate() {
                    let pieces: Vec<String> = wardrobe
                        .resolve(ids)
                        .map(|item| format!("{} {}", item.color, item.category))
                        .collect();
                    println!("{}. {}", n + 1, pieces.join(" + "));
                }
            }

            Commands::Shop { wardrobe } => {
                let wardrobe = load_wardrobe(&wardrobe)?;
                print_json(&self.stylist.shopping_recommendations(&wardrobe).await?)?;
            }

            Commands::Boutiques { lat, lng } => {
                let report = self
                    .stylist
                    .find_local_boutiques(LatLng {
                        latitude: lat,
                        longitude: lng,
                    })
                    .await?;
                println!("{}", report.text);
                for source in report.places.iter().filter_map(|chunk| chunk.source()) {
                    println!("- {} <{}>", source.title, source.uri);
                }
            }

            Commands::Image {
                prompt,
                aspect_ratio,
                size,
                out,
            } => {
                let url = self
                    .stylist
                    .generate_image(&prompt, &aspect_ratio, &size)
                    .await?;
                match out {
                    Some(path) => {
                        write_file(&path, &decode_data_url(&url)?)?;
                        println!("Saved {}", path.display());
                    }
                    None => println!("{url}"),
                }
            }

            Commands::Video { prompt, out } => {
                println!("Generating video; this can take a few minutes...");
                let video = self.stylist.generate_style_video(&prompt).await?;
                write_file(&out, &video)?;
                println!("Saved {}", out.display());
            }
        }

        Ok(())
    }
}

/// What to tell the user about a failed command.
///
/// Backend failures are reported by class; local failures keep their detail.
pub fn error_message(err: &AtelierError) -> String {
    match err.kind() {
        AtelierErrorKind::Gemini(_) => err.class().user_message().to_string(),
        other => other.to_string(),
    }
}

/// Log a failed command and print its message to stderr.
pub fn report_error(err: &AtelierError) {
    error!(error = %err, "Command failed");
    eprintln!("{}", error_message(err));
}

fn read_file(path: &Path) -> AtelierResult<Vec<u8>> {
    debug!(path = %path.display(), "Reading file");
    std::fs::read(path)
        .map_err(|e| IoError::new(path.display().to_string(), e.to_string()).into())
}

fn write_file(path: &Path, bytes: &[u8]) -> AtelierResult<()> {
    std::fs::write(path, bytes)
        .map_err(|e| IoError::new(path.display().to_string(), e.to_string()).into())
}

fn load_wardrobe(path: &Path) -> AtelierResult<Wardrobe> {
    let bytes = read_file(path)?;
    let wardrobe: Wardrobe = serde_json::from_slice(&bytes)
        .map_err(|e| JsonError::new(format!("{}: {}", path.display(), e)))?;
    debug!(items = wardrobe.items.len(), "Loaded wardrobe");
    Ok(wardrobe)
}

fn decode_data_url(url: &str) -> AtelierResult<Vec<u8>> {
    let data = url.strip_prefix(PNG_DATA_URL_PREFIX).unwrap_or(url);
    Ok(decode_base64(data)?)
}

fn print_json<T: Serialize>(value: &T) -> AtelierResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier::{GeminiError, GeminiErrorKind};
    use std::io::Write;

    #[test]
    fn test_backend_errors_use_class_message() {
        let err: AtelierError = GeminiError::new(GeminiErrorKind::HttpError {
            status_code: 429,
            message: "quota".to_string(),
        })
        .into();
        assert_eq!(
            error_message(&err),
            "AI quota exceeded. Please wait a minute before trying again."
        );

        let err: AtelierError = GeminiError::new(GeminiErrorKind::InvalidCredential).into();
        assert_eq!(error_message(&err), "API key issue. Please re-select your key.");
    }

    #[test]
    fn test_local_errors_keep_detail() {
        let err: AtelierError = IoError::new("closet.json", "No such file or directory").into();
        assert!(error_message(&err).contains("closet.json"));
    }

    #[test]
    fn test_load_wardrobe_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{"items":[{{"id":"a1","imageUrl":"","category":"Shoes","color":"tan","createdAt":1700000000000}}]}}"#
        )?;

        let wardrobe = load_wardrobe(file.path())?;
        assert_eq!(wardrobe.items.len(), 1);
        assert_eq!(wardrobe.items[0].color, "tan");
        assert!(wardrobe.outfits.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_wardrobe_rejects_bad_json() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "not a wardrobe")?;

        let err = load_wardrobe(file.path()).unwrap_err();
        assert!(matches!(err.kind(), AtelierErrorKind::Json(_)));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_file(Path::new("/definitely/not/here.jpg")).unwrap_err();
        assert!(matches!(err.kind(), AtelierErrorKind::Io(_)));
    }

    #[test]
    fn test_decode_data_url() -> anyhow::Result<()> {
        let url = format!("{}{}", PNG_DATA_URL_PREFIX, encode_base64(b"\x89PNG"));
        assert_eq!(decode_data_url(&url)?, b"\x89PNG");
        Ok(())
    }
}
