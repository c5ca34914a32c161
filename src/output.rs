use std::io::{BufRead, Write};

use crate::Mode;

/// Render generated content inside a titled banner
pub fn render_section(title: &str, body: &str) -> String {
    format!("\n—— {title} ——\n\n{}\n\n——————\n", body.trim())
}

/// Present the two-option menu and read a choice, re-prompting until the
/// input is `1` or `2`. Returns `None` on end of input.
pub fn read_menu_choice(input: &mut impl BufRead, out: &mut impl Write) -> std::io::Result<Option<Mode>> {
    writeln!(out, "\nChoose an option:")?;
    writeln!(out, "1. Summary (concise bullet-point analysis)")?;
    writeln!(out, "2. Detailed description with interactive Q&A")?;

    let mut prompt = "Enter 1 or 2: ";
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match line.trim() {
            "1" => return Ok(Some(Mode::Summary)),
            "2" => return Ok(Some(Mode::Detailed)),
            _ => prompt = "Please enter 1 or 2: ",
        }
    }
}
