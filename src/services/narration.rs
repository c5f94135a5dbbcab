//! Read-aloud support.
//!
//! [`Narrator`] tracks whether a story is being spoken and which utterance is
//! current; the actual voice comes from a [`SpeechEngine`].

use dioxus::prelude::*;

pub trait SpeechEngine {
    /// Starts speaking `text`; the engine reports the end with `utterance`
    fn speak(&self, utterance: u64, text: &str, rate: f32);
    /// Stops whatever is being spoken
    fn cancel(&self);
}

pub struct Narrator<E> {
    engine: E,
    rate: f32,
    speaking: bool,
    utterance: u64,
}

impl<E: SpeechEngine> Narrator<E> {
    pub fn new(engine: E, rate: f32) -> Self {
        Self {
            engine,
            rate,
            speaking: false,
            utterance: 0,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Starts reading `text`, or stops if already reading
    pub fn toggle(&mut self, text: &str) {
        if self.speaking {
            self.stop();
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        // anything still queued from an earlier utterance goes first
        self.engine.cancel();
        self.utterance += 1;
        self.speaking = true;
        log::debug!("Narration {} started", self.utterance);
        self.engine.speak(self.utterance, text, self.rate);
    }

    /// The engine finished `utterance`; late reports for older ones are ignored
    pub fn finished(&mut self, utterance: u64) {
        if utterance == self.utterance && self.speaking {
            log::debug!("Narration {} finished", utterance);
            self.speaking = false;
        }
    }

    pub fn stop(&mut self) {
        if self.speaking {
            self.engine.cancel();
            self.speaking = false;
        }
    }
}

const SPEAK_JS: &str = r#"
    const request = await dioxus.recv();
    const synth = window.speechSynthesis;
    if (!synth) {
        dioxus.send(false);
    } else {
        const utterance = new SpeechSynthesisUtterance(request.text);
        utterance.rate = request.rate;
        const done = () => dioxus.send(true);
        utterance.onend = done;
        utterance.onerror = done;
        synth.speak(utterance);
    }
"#;

/// `window.speechSynthesis` in the webview
#[derive(Clone, Copy)]
pub struct BrowserSpeech {
    on_end: EventHandler<u64>,
}

impl BrowserSpeech {
    pub fn new(on_end: EventHandler<u64>) -> Self {
        Self { on_end }
    }
}

impl SpeechEngine for BrowserSpeech {
    fn speak(&self, utterance: u64, text: &str, rate: f32) {
        let on_end = self.on_end;
        let request = serde_json::json!({ "text": text, "rate": rate });

        spawn(async move {
            let mut eval = document::eval(SPEAK_JS);
            if let Err(e) = eval.send(request) {
                log::error!("Speech synthesis unavailable: {:?}", e);
            } else {
                match eval.recv::<bool>().await {
                    Ok(true) => {}
                    Ok(false) => log::warn!("No speech synthesis in this webview"),
                    Err(e) => log::warn!("Speech synthesis ended abnormally: {:?}", e),
                }
            }
            on_end.call(utterance);
        });
    }

    fn cancel(&self) {
        document::eval("window.speechSynthesis && window.speechSynthesis.cancel();");
    }
}
