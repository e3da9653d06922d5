use base64::{engine::general_purpose::STANDARD, Engine as _};

const IMAGE_WIDTH: u32 = 300;
const IMAGE_HEIGHT: u32 = 180;

/// Colored tile with the location's initial, used in place of a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderImage {
    pub hue: u16,
    pub letter: String,
}

impl PlaceholderImage {
    pub fn for_name(name: &str) -> Self {
        let hue = name_hash(name).rem_euclid(360) as u16;
        let letter = name
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string());
        Self { hue, letter }
    }

    pub fn svg(&self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<rect width="{w}" height="{h}" fill="hsl({hue}, 65%, 55%)" />"#,
                r#"<text x="150" y="95" font-family="Arial, sans-serif" font-size="72" fill="white" "#,
                r#"text-anchor="middle" dominant-baseline="middle">{letter}</text></svg>"#
            ),
            w = IMAGE_WIDTH,
            h = IMAGE_HEIGHT,
            hue = self.hue,
            letter = escape_xml(&self.letter),
        )
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.svg()))
    }
}

/// `hash = unit + ((hash << 5) - hash)` over UTF-16 units, with the shift
/// applied to the 32-bit truncation of `hash` like a browser engine does.
pub fn name_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0_i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit).wrapping_add(shifted.wrapping_sub(hash))
    })
}

fn escape_xml(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_always_gives_same_image() {
        let first = PlaceholderImage::for_name("Eiffel Tower");
        for _ in 0..10 {
            assert_eq!(PlaceholderImage::for_name("Eiffel Tower"), first);
        }
        assert_eq!(first.letter, "E");
        assert!(first.hue < 360);
    }

    #[test]
    fn hash_matches_browser_arithmetic() {
        assert_eq!(name_hash(""), 0);
        assert_eq!(name_hash("A"), 65);
        // 98 + ((97 << 5) - 97)
        assert_eq!(name_hash("ab"), 3105);
        assert_eq!(PlaceholderImage::for_name("ab").hue, 225);
    }

    #[test]
    fn long_names_wrap_the_shift_without_panicking() {
        let name = "Musée national des arts asiatiques Guimet".repeat(8);
        let image = PlaceholderImage::for_name(&name);
        assert!(image.hue < 360);
        assert_eq!(image.letter, "M");
    }

    #[test]
    fn empty_name_uses_question_mark() {
        let image = PlaceholderImage::for_name("");
        assert_eq!(image.letter, "?");
        assert_eq!(image.hue, 0);
    }

    #[test]
    fn lowercase_initial_is_uppercased_and_escaped_in_svg() {
        assert_eq!(PlaceholderImage::for_name("école").letter, "É");
        let svg = PlaceholderImage::for_name("<tag>").svg();
        assert!(svg.contains(">&lt;</text>"));
        assert!(PlaceholderImage::for_name("x")
            .data_uri()
            .starts_with("data:image/svg+xml;base64,"));
    }
}
