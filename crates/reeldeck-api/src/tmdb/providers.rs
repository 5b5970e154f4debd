/// Landing pages of the streaming services TMDB reports under watch/providers.
const PROVIDER_LINKS: &[(&str, &str)] = &[
    ("Netflix", "https://www.netflix.com"),
    ("Amazon Prime Video", "https://www.primevideo.com"),
    ("Amazon Video", "https://www.amazon.com/video"),
    ("Disney Plus", "https://www.disneyplus.com"),
    ("Hulu", "https://www.hulu.com"),
    ("Max", "https://www.max.com"),
    ("HBO Max", "https://www.max.com"),
    ("Apple TV Plus", "https://tv.apple.com"),
    ("Apple TV", "https://tv.apple.com"),
    ("Paramount Plus", "https://www.paramountplus.com"),
    ("Peacock", "https://www.peacocktv.com"),
    ("Peacock Premium", "https://www.peacocktv.com"),
    ("Crunchyroll", "https://www.crunchyroll.com"),
    ("YouTube", "https://www.youtube.com"),
    ("Google Play Movies", "https://play.google.com/store/movies"),
    ("Tubi TV", "https://tubitv.com"),
    ("Pluto TV", "https://pluto.tv"),
    ("Mubi", "https://mubi.com"),
];

/// Website for a provider name, matched case-insensitively. Unknown names
/// yield `None`.
pub fn provider_link(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PROVIDER_LINKS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, url)| *url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_providers() {
        assert_eq!(provider_link("Netflix"), Some("https://www.netflix.com"));
        assert_eq!(provider_link(" disney plus "), Some("https://www.disneyplus.com"));
    }

    #[test]
    fn test_unknown_provider_is_none() {
        assert_eq!(provider_link("Local Video Store"), None);
        assert_eq!(provider_link(""), None);
    }
}
