// Sanitization utilities
// Scrubs patient contact details out of strings before they are logged.

/// Sanitizer for error messages and audit detail strings.
///
/// Masks email addresses and long digit runs (phone numbers, identifiers)
/// so free-text error messages can be logged without carrying PHI.
pub struct DataSanitizer;

impl DataSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Replace email addresses and 7+ digit runs with placeholders.
    pub fn sanitize_for_logging(&self, data: &str) -> String {
        let masked = Self::mask_emails(data);
        Self::mask_digit_runs(&masked)
    }

    fn mask_emails(data: &str) -> String {
        data.split_whitespace()
            .map(|word| {
                if word.contains('@') && word.contains('.') {
                    "<email>"
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn mask_digit_runs(data: &str) -> String {
        let mut out = String::with_capacity(data.len());
        let mut run = String::new();
        for ch in data.chars() {
            if ch.is_ascii_digit() || (ch == '+' && run.is_empty()) {
                run.push(ch);
            } else {
                Self::flush_run(&mut out, &mut run);
                out.push(ch);
            }
        }
        Self::flush_run(&mut out, &mut run);
        out
    }

    fn flush_run(out: &mut String, run: &mut String) {
        if run.chars().filter(|c| c.is_ascii_digit()).count() >= 7 {
            out.push_str("<number>");
        } else {
            out.push_str(run);
        }
        run.clear();
    }
}

impl Default for DataSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_email() {
        let s = DataSanitizer::new();
        let out = s.sanitize_for_logging("notify jane.doe@example.com failed");
        assert_eq!(out, "notify <email> failed");
    }

    #[test]
    fn test_masks_phone_number() {
        let s = DataSanitizer::new();
        let out = s.sanitize_for_logging("send to +15551234567 rejected");
        assert_eq!(out, "send to <number> rejected");
    }

    #[test]
    fn test_keeps_short_numbers() {
        let s = DataSanitizer::new();
        let out = s.sanitize_for_logging("retry 3 of 5");
        assert_eq!(out, "retry 3 of 5");
    }
}
