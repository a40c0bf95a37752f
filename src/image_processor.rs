//! # Image Processing Module
//!
//! Questo modulo gestisce la normalizzazione di tutte le immagini in ingresso
//! verso un unico formato canonico: JPEG a qualità fissa.
//!
//! ## Pipeline di Ottimizzazione
//!
//! 1. **Decode**: formato rilevato dal contenuto, fallback sull'estensione
//! 2. **Color mode**: immagini con canale alpha (incluse PNG a palette con
//!    trasparenza) vengono composte sul colore di sfondo configurato
//!    (default bianco); tutto il resto è convertito in RGB a 8 bit
//! 3. **Resize**: solo se `width > max_width`, Lanczos3, aspect ratio
//!    preservato con `height = round(height * max_width / width)`
//! 4. **Encode**: JPEG con `Config::quality` in un file temporaneo dentro la
//!    directory di export
//! 5. **Entropy**: `jpegtran -optimize -copy none` ricalcola tabelle di
//!    Huffman ottimali (lossless); si tiene il risultato solo se non è più
//!    grande. Senza `jpegtran` resta l'encoding baseline
//! 6. **Persist**: rename atomico su `{token}.jpg`
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output |
//! |---------|-------|--------|
//! | JPEG    | ✅    | ✅     |
//! | PNG     | ✅    | ❌ → JPEG |
//! | WebP    | ✅    | ❌ → JPEG |
//!
//! ## Error Handling
//!
//! - **Decode fallito**: errore per il singolo file, nessun output scritto
//! - **Encode fallito**: il file temporaneo viene rimosso al drop
//! - **jpegtran fallito**: warning, si pubblica l'encoding baseline
//! - La cancellazione del sorgente è responsabilità di `TaskOptimizer`
//!
//! ## Concorrenza
//!
//! Decode, resize ed encode sono CPU-bound e girano su
//! `tokio::task::spawn_blocking`; il chiamante attende il risultato prima di
//! passare all'asset successivo.

use crate::config::Config;
use crate::error::IngestError;
use crate::optimizer::path_resolver::TEMP_FILE_PREFIX;
use crate::{args, platform::PlatformCommands};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, RgbImage};
use serde::Serialize;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Once;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of re-encoding one image
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub source: Dimensions,
    pub output: Dimensions,
    pub bytes_written: u64,
}

/// Baseline JPEG waiting in the export directory to be persisted
struct EncodedImage {
    temp: NamedTempFile,
    source: Dimensions,
    output: Dimensions,
}

/// Dimensions an image should have after enforcing `max_width`.
///
/// Images not wider than `max_width` keep their dimensions exactly.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> Dimensions {
    if width <= max_width {
        return Dimensions { width, height };
    }

    let scaled = (height as f64 * max_width as f64 / width as f64).round();
    Dimensions {
        width: max_width,
        height: (scaled as u32).max(1),
    }
}

/// Convert to opaque 8-bit RGB, compositing transparent pixels over `background`
pub fn flatten(image: DynamicImage, background: [u8; 3]) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flat = RgbImage::new(width, height);

    for (dst, src) in flat.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u16;
        for c in 0..3 {
            let blended = src[c] as u16 * alpha + background[c] as u16 * (255 - alpha);
            dst[c] = ((blended + 127) / 255) as u8;
        }
    }

    flat
}

fn temp_jpeg_in(dir: &Path, prefix: &str) -> Result<NamedTempFile, IngestError> {
    Ok(tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".jpg")
        .tempfile_in(dir)?)
}

/// Lossless Huffman-table optimization of an encoded JPEG via `jpegtran`
#[derive(Debug, Clone)]
pub struct JpegOptimizer {
    program: PathBuf,
}

impl Default for JpegOptimizer {
    fn default() -> Self {
        Self::with_program(PlatformCommands::instance().get_tool_path("jpegtran"))
    }
}

impl JpegOptimizer {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Rewrite `input` into `output` with optimized Huffman tables and no
    /// metadata. Returns `Ok(false)`, leaving `output` alone, when the tool
    /// is not installed.
    pub async fn optimize(&self, input: &Path, output: &Path) -> Result<bool, IngestError> {
        let result = Command::new(&self.program)
            .args(args![
                "-optimize",
                "-copy",
                "none",
                "-outfile",
                output.to_string_lossy(),
                input.to_string_lossy()
            ])
            .stdin(Stdio::null())
            .output()
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                static MISSING: Once = Once::new();
                MISSING.call_once(|| {
                    warn!(
                        "{} not found: JPEG output keeps standard Huffman tables",
                        self.program.display()
                    )
                });
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if !result.status.success() {
            return Err(IngestError::ExternalTool {
                tool: self.program.display().to_string(),
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(true)
    }
}

/// Re-encodes images to the canonical JPEG output
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    quality: u8,
    max_width: u32,
    background: [u8; 3],
    jpeg_optimizer: JpegOptimizer,
}

impl ImageProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            quality: config.quality,
            max_width: config.max_width,
            background: config.background,
            jpeg_optimizer: JpegOptimizer::default(),
        }
    }

    pub fn with_jpeg_optimizer(mut self, jpeg_optimizer: JpegOptimizer) -> Self {
        self.jpeg_optimizer = jpeg_optimizer;
        self
    }

    /// Decode `input_path`, normalize it and write the JPEG to `output_path`.
    ///
    /// The output is written to a temporary file next to `output_path` and
    /// renamed into place, so a failure never leaves a partial export.
    pub async fn optimize(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<OptimizedImage, IngestError> {
        let export_dir = output_path.parent().ok_or_else(|| {
            IngestError::Validation(format!("Output path has no parent: {}", output_path.display()))
        })?;

        let processor = self.clone();
        let input: PathBuf = input_path.to_path_buf();
        let dir: PathBuf = export_dir.to_path_buf();

        let encoded = tokio::task::spawn_blocking(move || processor.encode_blocking(&input, &dir))
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(format!("Image task failed: {}", e))))??;

        let source = encoded.source;
        let output = encoded.output;
        let best = self.optimize_entropy(encoded.temp, export_dir).await?;
        best.as_file().sync_all()?;
        best.persist(output_path)?;

        let bytes_written = std::fs::metadata(output_path)?.len();

        Ok(OptimizedImage {
            source,
            output,
            bytes_written,
        })
    }

    fn encode_blocking(&self, input_path: &Path, export_dir: &Path) -> Result<EncodedImage, IngestError> {
        let decoded = image::io::Reader::open(input_path)?
            .with_guessed_format()?
            .decode()?;

        let (width, height) = decoded.dimensions();
        let source = Dimensions { width, height };
        debug!(
            "Decoded {} ({}, {:?})",
            input_path.display(),
            source,
            decoded.color()
        );

        let mut rgb = flatten(decoded, self.background);

        let target = target_dimensions(source.width, source.height, self.max_width);
        if target != source {
            debug!("Downscaling {} -> {}", source, target);
            rgb = image::imageops::resize(&rgb, target.width, target.height, FilterType::Lanczos3);
        }

        let mut temp = temp_jpeg_in(export_dir, TEMP_FILE_PREFIX)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            Self::encode_jpeg(&rgb, self.quality, &mut writer)?;
            writer.flush()?;
        }

        Ok(EncodedImage {
            temp,
            source,
            output: target,
        })
    }

    /// Run the Huffman pass and keep whichever encoding is smaller
    async fn optimize_entropy(
        &self,
        baseline: NamedTempFile,
        export_dir: &Path,
    ) -> Result<NamedTempFile, IngestError> {
        let candidate = temp_jpeg_in(export_dir, &format!("{}opt-", TEMP_FILE_PREFIX))?;

        match self.jpeg_optimizer.optimize(baseline.path(), candidate.path()).await {
            Ok(true) => {
                let baseline_len = std::fs::metadata(baseline.path())?.len();
                let optimized_len = std::fs::metadata(candidate.path())?.len();
                if optimized_len > 0 && optimized_len <= baseline_len {
                    debug!("Huffman optimization: {} -> {} bytes", baseline_len, optimized_len);
                    Ok(candidate)
                } else {
                    Ok(baseline)
                }
            }
            Ok(false) => Ok(baseline),
            Err(e) => {
                warn!("JPEG optimization failed, keeping baseline encoding: {}", e);
                Ok(baseline)
            }
        }
    }

    /// Encode an RGB buffer as JPEG at the given quality
    pub fn encode_jpeg<W: Write>(image: &RgbImage, quality: u8, writer: &mut W) -> Result<(), IngestError> {
        let mut encoder = JpegEncoder::new_with_quality(writer, quality);
        encoder.encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)?;
        Ok(())
    }
}
