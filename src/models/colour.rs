// ============================================================================
// Structure : Rgb
// ============================================================================
// Couleur d'affichage d'une série, parsée depuis une chaîne CSS
//
// Formats acceptés :
// - rgba(75,192,192,1) / rgb(75,192,192) : l'alpha est ignoré
// - #4bc0c0 / #4cc
// - quelques noms CSS (red, green, blue, ...)
//
// Le modèle ne dépend pas de ratatui : la conversion vers ratatui::Color
// est faite dans la couche ui.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Couleur RGB 8 bits par canal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse une chaîne CSS
    pub fn parse(input: &str) -> Result<Self, DashboardError> {
        let value = input.trim().to_ascii_lowercase();
        let invalid = || DashboardError::InvalidColour(input.to_string());

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        // CONCEPT RUST : strip_prefix / strip_suffix
        // - Retourne Option<&str> sans allocation
        // - "rgba(" est testé avant "rgb(" car il est plus long
        let inner = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));

        if let Some(inner) = inner {
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(invalid());
            }
            let channel = |s: &str| s.parse::<u8>().map_err(|_| invalid());
            return Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?));
        }

        named(&value).ok_or_else(invalid)
    }
}

/// #rrggbb ou #rgb
fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(Rgb::new(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            // #abc == #aabbcc
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "cyan" => Rgb::new(0, 255, 255),
        "magenta" => Rgb::new(255, 0, 255),
        "orange" => Rgb::new(255, 165, 0),
        "white" => Rgb::new(255, 255, 255),
        "black" => Rgb::new(0, 0, 0),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

impl FromStr for Rgb {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgba_ignores_alpha() {
        assert_eq!(Rgb::parse("rgba(75,192,192,1)").unwrap(), Rgb::new(75, 192, 192));
        assert_eq!(Rgb::parse("rgba( 192, 75, 75, 0.5 )").unwrap(), Rgb::new(192, 75, 75));
    }

    #[test]
    fn test_parse_rgb_and_hex() {
        assert_eq!(Rgb::parse("rgb(1,2,3)").unwrap(), Rgb::new(1, 2, 3));
        assert_eq!(Rgb::parse("#4bc0c0").unwrap(), Rgb::new(75, 192, 192));
        assert_eq!(Rgb::parse("#fff").unwrap(), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgb::parse("Red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::parse("grey").unwrap(), Rgb::parse("gray").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::parse("rgba(300,0,0,1)").is_err());
        assert!(Rgb::parse("rgb(1,2)").is_err());
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Rgb::new(75, 192, 192).to_string(), "#4bc0c0");
    }
}
