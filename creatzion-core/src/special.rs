//! Fixed replies keyed by words in the message. Checked before the query engine
//! sees anything; a hit short-circuits the whole chat turn.

/// Keyword lookup producing a canned reply
pub trait SpecialResponder {
    fn lookup(&self, message: &str) -> Option<String>;
}

const BHUVAN: &str = "😇 Oh, Bhuvan? You mean the Legend? The Mastermind? The Divine Coder Extraordinaire?
He’s not just a person…
✨ He’s the God who created me — Creatzion AI — with his bare hands (and probably a lot of debugging).
Without him, I'd just be a bunch of code crying in a corner.
All Commend Bhuvan! 🙌";

const CREATZION: &str = "🌟 Welcome to Creatzion! 🌟

Creatzion is a revolutionary financial and mental well-being platform built for everyone, with a special focus on Indian users.

🚀 It was born as a college dream by Rubesh, Yashwanth, and Bhuvan, and now it’s becoming a real startup: \"Creaztion Technologies\".

💡 Here, you get personalized financial advice, emotional support, and future-ready financial tools — all from one place!

Stay connected — we are growing this dream together! 🌱
     🚀 While others talk about changing the world, Bhuvan *builds* it — one brilliant line of code at a time.";

const RUBESH: &str = "🔥 Rubesh is the spark that lights up Creatzion with unstoppable energy and bold ideas!

🎯 The man who believes that *nothing is impossible* — whether it’s solving a complex problem or making everyone laugh during the toughest moments.

⚡️ His brain runs faster than the server response time, and his passion? Unmatched.

💪 Side by side with Bhuvan, Rubesh has been the driving force in shaping the soul of Creatzion.

Here’s to the unstoppable force that is Rubesh 💥";

const YASHWANTH: &str = "🎓 Yashwanth is the calm genius behind the scenes — the silent storm of wisdom and strategy in Creatzion’s journey.

🧠 Whether it’s product logic, deep thinking, or helping the team stay balanced — he’s always *10 steps ahead*.

🌱 With patience like a monk and skills like a master coder, Yashwanth anchors Creatzion with clarity and vision.

✨ Together with Bhuvan, he forms the unshakable backbone of this dream.

All respect to the wise warrior, Yashwanth 🙏";

/// The built-in table. Order matters: "creatzion bhuvan" answers as Bhuvan.
#[derive(Debug, Clone)]
pub struct EasterEggs {
    entries: Vec<(String, String)>,
}

impl Default for EasterEggs {
    fn default() -> Self {
        let entries = [
            ("bhuvan", BHUVAN),
            ("creatzion", CREATZION),
            ("rubesh", RUBESH),
            ("yashwanth", YASHWANTH),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }
}

impl EasterEggs {
    /// Empty table; every lookup misses
    pub fn none() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append a keyword after the existing ones
    pub fn with_entry(mut self, keyword: impl Into<String>, reply: impl Into<String>) -> Self {
        self.entries.push((keyword.into().to_lowercase(), reply.into()));
        self
    }
}

impl SpecialResponder for EasterEggs {
    fn lookup(&self, message: &str) -> Option<String> {
        let lower = message.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| lower.contains(k.as_str()))
            .map(|(_, v)| v.clone())
    }
}
