use std::io::{BufRead, Write};

use log::debug;

use crate::error::Result;
use crate::gemini::{GeminiClient, Turn};
use crate::{GeneratedContent, Transcript};

const EXIT_KEYWORDS: &[&str] = &["exit", "quit"];

/// True when the line asks to end the session
pub fn is_exit(line: &str) -> bool {
    let line = line.trim();
    EXIT_KEYWORDS.iter().any(|k| line.eq_ignore_ascii_case(k))
}

/// Answers one question given everything asked so far
#[allow(async_fn_in_trait)]
pub trait Answerer {
    async fn answer(&mut self, question: &str) -> Result<String>;
}

/// Q&A session backed by the generation API.
///
/// Keeps the full turn history so follow-up questions can refer to earlier
/// answers. History starts with the video context as a user turn and a short
/// model acknowledgment, keeping roles alternating.
pub struct GeminiSession {
    client: GeminiClient,
    turns: Vec<Turn>,
}

impl GeminiSession {
    pub fn new(client: GeminiClient, transcript: &Transcript, description: &GeneratedContent) -> Self {
        let context = seed_context(transcript, description);
        Self {
            client,
            turns: vec![
                Turn::user(context),
                Turn::model("Understood. Ask me anything about the video."),
            ],
        }
    }
}

impl Answerer for GeminiSession {
    async fn answer(&mut self, question: &str) -> Result<String> {
        self.turns.push(Turn::user(question));
        match self.client.generate_content(&self.turns).await {
            Ok(answer) => {
                self.turns.push(Turn::model(answer.clone()));
                debug!("Session grew to {} turns", self.turns.len());
                Ok(answer)
            }
            Err(e) => {
                // Drop the unanswered question so history stays consistent
                self.turns.pop();
                Err(e)
            }
        }
    }
}

fn seed_context(transcript: &Transcript, description: &GeneratedContent) -> String {
    format!(
        "You have full access to the transcript of a YouTube video titled \"{title}\", \
         along with a detailed description of it.\n\
         - Ground your answers in the transcript; cite specific moments or phrases when helpful.\n\
         - If the transcript lacks the answer, you may reason from context or general knowledge, \
         but say which you are using.\n\
         - If you truly don't know, say so concisely.\n\
         - Keep answers short and direct.\n\n\
         Description:\n{description}\n\n\
         Transcript:\n{text}",
        title = transcript.title,
        description = description.text,
        text = transcript.plain_text(),
    )
}

/// Read questions line by line until an exit keyword or end of input.
///
/// A failed generation call on one turn is reported inline and the loop keeps
/// going; the accumulated context survives the failure.
pub async fn run_loop<R, W, A>(mut input: R, mut out: W, answerer: &mut A) -> Result<()>
where
    R: BufRead,
    W: Write,
    A: Answerer,
{
    writeln!(out, "Enter your questions about the video (type 'exit' or 'quit' to end):")?;

    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?; // newline for clean exit on EOF
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit(question) {
            break;
        }

        match answerer.answer(question).await {
            Ok(answer) => writeln!(out, "Gemini: {}\n", answer.trim())?,
            Err(e) => writeln!(out, "[error] {e}")?,
        }
    }

    writeln!(out, "Chat session ended.")?;
    Ok(())
}
