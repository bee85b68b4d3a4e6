use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::Result;

/// Rule set source, validated by `build.rs`.
const RULE_SET_TOML: &str = include_str!("rule_set.toml");

static COMPILED: LazyLock<RuleSet> = LazyLock::new(|| match RuleSet::from_toml(RULE_SET_TOML) {
    Ok(rules) => rules,
    Err(e) => {
        tracing::warn!("compiled rule set rejected, using built-in defaults: {e}");
        RuleSet::default()
    }
});

/// The fixed typographic rule set applied to every conversion.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct RuleSet {
    pub fonts: FontRules,
    pub sizes: SizeRules,
    pub spacing: SpacingRules,
    pub indent: IndentRules,
    pub color: ColorRules,
    pub page: PageRules,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontRules {
    pub heading: String,
    pub body_east_asia: String,
    pub body_latin: String,
}

impl Default for FontRules {
    fn default() -> Self {
        Self {
            heading: "黑体".to_string(),
            body_east_asia: "宋体".to_string(),
            body_latin: "Times New Roman".to_string(),
        }
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizeRules {
    pub heading1: u32,
    pub heading2: u32,
    pub heading3: u32,
    pub body: u32,
}

impl Default for SizeRules {
    fn default() -> Self {
        Self {
            heading1: 16,
            heading2: 14,
            heading3: 14,
            body: 12,
        }
    }
}

impl SizeRules {
    /// Font size for a heading level; levels past 3 use the level 3 size.
    pub fn for_heading(&self, level: u8) -> u32 {
        match level {
            1 => self.heading1,
            2 => self.heading2,
            _ => self.heading3,
        }
    }
}

/// Paragraph spacing in points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpacingRules {
    pub line_exact: u32,
    pub before: u32,
    pub after: u32,
}

impl Default for SpacingRules {
    fn default() -> Self {
        Self {
            line_exact: 20,
            before: 0,
            after: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndentRules {
    /// Width of one character in points.
    pub char_width: u32,
    pub first_line_chars: u32,
    /// Characters of left indent added per list level.
    pub level_chars: u32,
}

impl Default for IndentRules {
    fn default() -> Self {
        Self {
            char_width: 12,
            first_line_chars: 2,
            level_chars: 2,
        }
    }
}

impl IndentRules {
    /// First-line indent of body paragraphs, in twips.
    pub fn first_line_twips(&self) -> u32 {
        pt_to_twips(self.char_width * self.first_line_chars)
    }

    /// Left indent of a numbered list item at `depth`, in twips.
    pub fn level_twips(&self, depth: usize) -> u32 {
        let depth = u32::try_from(depth).unwrap_or(u32::MAX);
        pt_to_twips(self.char_width * self.level_chars).saturating_mul(depth)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorRules {
    /// Hex RGB without the leading `#`.
    pub text: String,
}

impl Default for ColorRules {
    fn default() -> Self {
        Self {
            text: "000000".to_string(),
        }
    }
}

/// Page geometry in twips.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageRules {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    pub margin_right: u32,
}

impl Default for PageRules {
    fn default() -> Self {
        Self {
            width: 11906,
            height: 16838,
            margin_top: 1440,
            margin_bottom: 1440,
            margin_left: 1800,
            margin_right: 1800,
        }
    }
}

impl PageRules {
    /// Width available to body text, in twips.
    pub fn text_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }
}

impl RuleSet {
    /// The rule set compiled into this build.
    pub fn compiled() -> &'static RuleSet {
        &COMPILED
    }

    /// Parse a rule set from TOML; missing keys fall back to defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

pub(crate) fn pt_to_twips(pt: u32) -> u32 {
    pt * 20
}
