use crate::constants::EXPORT_FILE_PREFIX;
use crate::container::{encode_interleaved, BlockEncoder};
use crate::error::Result;
use crate::kits::SoundKit;
use crate::render::{render, RenderSettings};
use crate::sequence::Sequence;

/// A finished export, ready to be saved or offered for download.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `Soundscape-<epoch-millis>.<ext>`
pub fn export_file_name(epoch_ms: u64, extension: &str) -> String {
    format!("{EXPORT_FILE_PREFIX}-{epoch_ms}.{extension}")
}

/// Render `sequence` offline and encode it. An empty sequence exports nothing.
pub fn export(
    sequence: &Sequence,
    kit: SoundKit,
    settings: &RenderSettings,
    encoder: &mut dyn BlockEncoder,
    epoch_ms: u64,
) -> Result<Option<ExportedFile>> {
    if sequence.is_empty() {
        return Ok(None);
    }
    let buffer = render(sequence, kit, settings)?;
    let bytes = encode_interleaved(&buffer.to_interleaved_i16(), encoder)?;
    let file_name = export_file_name(epoch_ms, encoder.extension());
    log::info!("[export] {} ({} bytes)", file_name, bytes.len());
    Ok(Some(ExportedFile {
        file_name,
        mime_type: encoder.mime_type(),
        bytes,
    }))
}

/// Shows a busy indicator for as long as it lives.
///
/// `set_busy(true)` runs on creation and `set_busy(false)` on drop, so the
/// indicator is restored on every exit path, including early `?` returns.
pub struct BusyGuard<F: FnMut(bool)> {
    set_busy: F,
}

impl<F: FnMut(bool)> BusyGuard<F> {
    pub fn new(mut set_busy: F) -> Self {
        set_busy(true);
        Self { set_busy }
    }
}

impl<F: FnMut(bool)> Drop for BusyGuard<F> {
    fn drop(&mut self) {
        (self.set_busy)(false);
    }
}
