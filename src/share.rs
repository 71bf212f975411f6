//! Share-intent links for Twitter, Facebook, LinkedIn and WhatsApp. This is
//! pure URL construction; nothing here touches the network.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// The characters `encodeURIComponent` leaves alone are the alphanumerics
/// and `-_.!~*'()`; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes `s` the way `encodeURIComponent` does. Also suitable for
/// a single URL path segment.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// What to share.
#[derive(Clone, Debug, Default)]
pub struct Share<'a> {
    /// The absolute URL of the page being shared.
    pub url: &'a str,
    pub title: Option<&'a str>,

    /// Carried for the page's metadata; none of the four intents accept a
    /// description.
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,

    /// Replaces the title as the lead text when present.
    pub custom_message: Option<&'a str>,
}

/// The four share-intent URLs.
#[derive(Clone, Debug, PartialEq)]
pub struct ShareLinks {
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub whatsapp: String,
}

impl Share<'_> {
    pub fn links(&self) -> ShareLinks {
        let encode = |s: Option<&str>| encode_component(s.unwrap_or_default());
        let url = encode_component(self.url);
        let title = encode(self.title);
        let message = encode(self.custom_message);
        let image = encode(self.image_url);

        let twitter_text = match message.is_empty() {
            true => title.clone(),
            false => format!("{}%20{}", message, title),
        };
        let whatsapp_text = match message.is_empty() {
            true => format!("{}%20{}", title, url),
            false => format!("{}%20{}", message, url),
        };

        ShareLinks {
            twitter: match image.is_empty() {
                true => format!(
                    "https://twitter.com/intent/tweet?url={}&text={}",
                    url, twitter_text
                ),
                false => format!(
                    "https://twitter.com/intent/tweet?url={}&text={}&image={}",
                    url, twitter_text, image
                ),
            },
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={}", url),
            linkedin: format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                url
            ),
            whatsapp: match image.is_empty() {
                true => format!("https://api.whatsapp.com/send?text={}", whatsapp_text),
                false => format!(
                    "https://api.whatsapp.com/send?text={}%20{}",
                    whatsapp_text, image
                ),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_component() {
        assert_eq!(
            "https%3A%2F%2Fexample.org%2Fposts%2Fa%3Fb%3Dc%20d",
            encode_component("https://example.org/posts/a?b=c d")
        );
        assert_eq!("it's-(fine)_~*!.", encode_component("it's-(fine)_~*!."));
        assert_eq!("caf%C3%A9", encode_component("café"));
    }

    #[test]
    fn test_links_with_title() {
        let links = Share {
            url: "https://example.org/posts/hello",
            title: Some("Hello World"),
            ..Share::default()
        }
        .links();

        assert_eq!(
            ShareLinks {
                twitter: String::from(
                    "https://twitter.com/intent/tweet?url=https%3A%2F%2Fexample.org%2Fposts%2Fhello&text=Hello%20World"
                ),
                facebook: String::from(
                    "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fexample.org%2Fposts%2Fhello"
                ),
                linkedin: String::from(
                    "https://www.linkedin.com/sharing/share-offsite/?url=https%3A%2F%2Fexample.org%2Fposts%2Fhello"
                ),
                whatsapp: String::from(
                    "https://api.whatsapp.com/send?text=Hello%20World%20https%3A%2F%2Fexample.org%2Fposts%2Fhello"
                ),
            },
            links
        );
    }

    #[test]
    fn test_links_with_message_and_image() {
        let links = Share {
            url: "https://example.org/p",
            title: Some("Title"),
            description: Some("ignored"),
            image_url: Some("https://cdn.example.org/a.jpg"),
            custom_message: Some("Look!"),
        }
        .links();

        assert_eq!(
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fexample.org%2Fp&text=Look!%20Title&image=https%3A%2F%2Fcdn.example.org%2Fa.jpg",
            links.twitter
        );
        assert_eq!(
            "https://api.whatsapp.com/send?text=Look!%20https%3A%2F%2Fexample.org%2Fp%20https%3A%2F%2Fcdn.example.org%2Fa.jpg",
            links.whatsapp
        );
        assert!(!links.facebook.contains("ignored"));
        assert!(!links.linkedin.contains("ignored"));
    }

    #[test]
    fn test_links_without_title() {
        let links = Share {
            url: "https://example.org/",
            ..Share::default()
        }
        .links();
        assert_eq!(
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fexample.org%2F&text=",
            links.twitter
        );
        assert_eq!(
            "https://api.whatsapp.com/send?text=%20https%3A%2F%2Fexample.org%2F",
            links.whatsapp
        );
    }
}
