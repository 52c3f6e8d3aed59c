use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub name: &'static str,
    pub url: &'static str,
}

const LINKS: &[SocialLink] = &[
    SocialLink {
        name: "telegram",
        url: "https://t.me/BKSBackstage",
    },
    SocialLink {
        name: "medium",
        url: "https://medium.com/BackstageBks",
    },
    SocialLink {
        name: "twitter",
        url: "https://twitter.com/BackstageBks",
    },
    SocialLink {
        name: "facebook",
        url: "https://www.facebook.com/BKSBackstage",
    },
    SocialLink {
        name: "instagram",
        url: "https://www.instagram.com/bksbackstage/?hl=en",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AboutScreen;

impl AboutScreen {
    pub fn links(&self) -> &'static [SocialLink] {
        LINKS
    }

    pub fn link(&self, name: &str) -> Option<&'static SocialLink> {
        LINKS.iter().find(|l| l.name == name)
    }
}
