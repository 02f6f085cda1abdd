/// Normalizes generated text before it is applied.
///
/// Strips a surrounding markdown code fence and any document-level lines
/// (`\documentclass`, `\usepackage`, `\begin{document}`, `\end{document}`)
/// the service emitted despite being told not to.
pub fn clean_response(raw: &str) -> String {
    let unfenced = strip_code_fence(raw.trim());
    let kept: Vec<&str> = unfenced
        .lines()
        .filter(|line| !is_document_level(line))
        .collect();
    kept.join("\n").trim().to_string()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```latex).
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim_end()
}

fn is_document_level(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("\\documentclass")
        || line.starts_with("\\usepackage")
        || line == "\\begin{document}"
        || line == "\\end{document}"
}
