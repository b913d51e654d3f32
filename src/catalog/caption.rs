//! Two-line meme captions and their memegen URL encoding.

use std::fmt;

/// The text a template places on its image: a top and a bottom line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
    pub top: String,
    pub bottom: String,
}

impl Caption {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into().trim().to_string(),
            bottom: bottom.into().trim().to_string(),
        }
    }

    /// Caption with only a bottom line.
    pub fn bottom_only(bottom: impl Into<String>) -> Self {
        Self::new("", bottom)
    }

    /// `top/bottom` with each line escaped for a memegen image URL.
    ///
    /// ```
    /// use memegen_live::catalog::Caption;
    ///
    /// let caption = Caption::new("one does not simply", "walk into mordor?");
    /// assert_eq!(caption.to_path(), "one_does_not_simply/walk_into_mordor~q");
    /// assert_eq!(Caption::bottom_only("hi").to_path(), "_/hi");
    /// ```
    pub fn to_path(&self) -> String {
        format!("{}/{}", encode_line(&self.top), encode_line(&self.bottom))
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.top, self.bottom)
    }
}

/// Escape one caption line using memegen's reserved-character rules.
fn encode_line(line: &str) -> String {
    if line.is_empty() {
        return "_".into();
    }
    let mut out = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        match c {
            '_' => out.push_str("__"),
            '-' => out.push_str("--"),
            ' ' => out.push('_'),
            '?' => out.push_str("~q"),
            '%' => out.push_str("~p"),
            '#' => out.push_str("~h"),
            '/' => out.push_str("~s"),
            '\\' => out.push_str("~b"),
            '&' => out.push_str("~a"),
            '<' => out.push_str("~l"),
            '>' => out.push_str("~g"),
            '\n' => out.push_str("~n"),
            '"' => out.push_str("''"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(encode_line("a_b-c"), "a__b--c");
        assert_eq!(encode_line("100% #1 a/b"), "100~p_~h1_a~sb");
        assert_eq!(encode_line("say \"hi\""), "say_''hi''");
        assert_eq!(encode_line("a&b<c>d\\e"), "a~ab~lc~gd~be");
    }

    #[test]
    fn empty_lines_become_underscore() {
        assert_eq!(Caption::default().to_path(), "_/_");
    }

    #[test]
    fn new_trims_lines() {
        let caption = Caption::new("  top ", "\tbottom\n");
        assert_eq!(caption.top, "top");
        assert_eq!(caption.bottom, "bottom");
    }

    #[test]
    fn display_joins_lines() {
        assert_eq!(Caption::new("a", "b").to_string(), "a / b");
    }
}
