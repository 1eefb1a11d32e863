//! Speech-to-text capability.
//!
//! Recognition itself is provided by the host environment. The application
//! only engages and disengages it and collects the final transcript.

use crate::error::{EchoryaError, Result};

/// Notice shown when the host provides no speech recognition.
pub const SPEECH_UNSUPPORTED_MESSAGE: &str =
    "Speech recognition is not supported in this environment.";

/// A speech recognizer that can be started and stopped on demand.
pub trait SpeechInput: Send {
    fn is_available(&self) -> bool;

    /// Begins capturing. Fails with [`EchoryaError::Unsupported`] when no
    /// recognizer exists.
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    fn is_recording(&self) -> bool;

    /// Takes the final transcript of the last capture, if any.
    fn take_transcript(&mut self) -> Option<String>;
}

/// Recognizer for environments without speech support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSpeechInput;

impl SpeechInput for UnavailableSpeechInput {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<()> {
        Err(EchoryaError::unsupported(SPEECH_UNSUPPORTED_MESSAGE))
    }

    fn stop(&mut self) {}

    fn is_recording(&self) -> bool {
        false
    }

    fn take_transcript(&mut self) -> Option<String> {
        None
    }
}

/// Appends a transcript to pending input, separated by a single space.
pub fn append_transcript(input: &str, transcript: &str) -> String {
    if input.is_empty() {
        transcript.to_string()
    } else {
        format!("{input} {transcript}")
    }
}

/// What [`toggle`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicToggle {
    Started,
    /// Capture ended; the transcript, if any, was appended to the input.
    Stopped { transcript: Option<String> },
}

/// Starts capturing, or stops and appends the transcript to `pending`.
///
/// An unavailable recognizer is reported as [`EchoryaError::Unsupported`]
/// without being started.
pub fn toggle(input: &mut dyn SpeechInput, pending: &mut String) -> Result<MicToggle> {
    if input.is_recording() {
        input.stop();
        let transcript = input.take_transcript();
        if let Some(text) = &transcript {
            *pending = append_transcript(pending, text);
        }
        return Ok(MicToggle::Stopped { transcript });
    }

    if !input.is_available() {
        return Err(EchoryaError::unsupported(SPEECH_UNSUPPORTED_MESSAGE));
    }
    input.start()?;
    Ok(MicToggle::Started)
}
