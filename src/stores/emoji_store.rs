//! Static emoji and emoticon tables plus glyph rendering.
//!
//! The tables are deliberately small but representative; the picker only
//! needs names, keywords, codepoints and a tone-capability flag. Skin tone
//! is applied at render time by appending a Fitzpatrick modifier.

/// A single emoji entry. `hex` holds the codepoint sequence, lowercase,
/// joined by `-` when the glyph is composed of several scalars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emoji {
    pub name: &'static str,
    pub hex: &'static str,
    pub keywords: &'static str,
    pub tone: bool,
}

/// A text emoticon entry. Inserted literally, never toned, never recorded
/// in history.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emoticon {
    pub name: &'static str,
    pub chars: &'static str,
    pub keywords: &'static str,
}

/// One displayable row in the picker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Candidate {
    Emoji(&'static Emoji),
    Emoticon(&'static Emoticon),
}

impl Candidate {
    pub fn name(&self) -> &'static str {
        match self {
            Candidate::Emoji(e) => e.name,
            Candidate::Emoticon(e) => e.name,
        }
    }

    /// The text that gets inserted into the field when this candidate is
    /// committed.
    pub fn glyph(&self, skintone: &str) -> String {
        match self {
            Candidate::Emoji(e) => print_emoji(e, skintone),
            Candidate::Emoticon(e) => e.chars.to_string(),
        }
    }

    pub fn as_emoji(&self) -> Option<&'static Emoji> {
        match self {
            Candidate::Emoji(e) => Some(e),
            Candidate::Emoticon(_) => None,
        }
    }
}

/// Case-insensitive substring match over name and keywords. The filter is
/// already lowercased by the session; the tables are lowercase by
/// construction.
pub fn matches_filter(candidate: &Candidate, filter: &str) -> bool {
    match candidate {
        Candidate::Emoji(e) => e.name.contains(filter) || e.keywords.contains(filter),
        Candidate::Emoticon(e) => e.name.contains(filter) || e.keywords.contains(filter),
    }
}

/// Skin tone identifiers mapped to Fitzpatrick modifier scalars. Anything
/// not listed (including the default "yellow") renders unmodified.
const SKIN_TONES: &[(&str, char)] = &[
    ("light", '\u{1F3FB}'),
    ("medium-light", '\u{1F3FC}'),
    ("medium", '\u{1F3FD}'),
    ("medium-dark", '\u{1F3FE}'),
    ("dark", '\u{1F3FF}'),
];

/// Render an emoji entry to its final glyph, appending the skin tone
/// modifier when the emoji supports one and a known tone is selected.
pub fn print_emoji(emoji: &Emoji, skintone: &str) -> String {
    let mut glyph: String = emoji
        .hex
        .split('-')
        .filter_map(|part| u32::from_str_radix(part, 16).ok())
        .filter_map(char::from_u32)
        .collect();

    if emoji.tone {
        if let Some((_, modifier)) = SKIN_TONES.iter().find(|(name, _)| *name == skintone) {
            glyph.push(*modifier);
        }
    }

    glyph
}

/// Look an emoji up by its codepoint sequence. Used to resolve persisted
/// history entries back to table references.
pub fn find_by_hex(hex: &str) -> Option<&'static Emoji> {
    EMOJIS.iter().find(|e| e.hex == hex)
}

pub static EMOJIS: &[Emoji] = &[
    Emoji { name: "grinning", hex: "1f600", keywords: "face smile happy joy grin", tone: false },
    Emoji { name: "smiley", hex: "1f603", keywords: "face happy joy smiling open mouth", tone: false },
    Emoji { name: "smile", hex: "1f604", keywords: "face happy joy laugh pleased", tone: false },
    Emoji { name: "grin", hex: "1f601", keywords: "face happy smile beaming teeth", tone: false },
    Emoji { name: "joy", hex: "1f602", keywords: "face cry tears laugh lol", tone: false },
    Emoji { name: "rofl", hex: "1f923", keywords: "face rolling floor laughing lol", tone: false },
    Emoji { name: "wink", hex: "1f609", keywords: "face eye flirt playful", tone: false },
    Emoji { name: "blush", hex: "1f60a", keywords: "face smile happy flushed shy", tone: false },
    Emoji { name: "heart_eyes", hex: "1f60d", keywords: "face love crush adore", tone: false },
    Emoji { name: "sunglasses", hex: "1f60e", keywords: "face cool shades bright", tone: false },
    Emoji { name: "thinking", hex: "1f914", keywords: "face hmm wondering consider", tone: false },
    Emoji { name: "neutral", hex: "1f610", keywords: "face meh expressionless blank", tone: false },
    Emoji { name: "sob", hex: "1f62d", keywords: "face cry sad tears upset", tone: false },
    Emoji { name: "scream", hex: "1f631", keywords: "face fear shocked horror", tone: false },
    Emoji { name: "angry", hex: "1f620", keywords: "face mad annoyed rage", tone: false },
    Emoji { name: "sleeping", hex: "1f634", keywords: "face tired zzz rest", tone: false },
    Emoji { name: "kiss", hex: "1f618", keywords: "face love heart blow", tone: false },
    Emoji { name: "party", hex: "1f973", keywords: "face celebration birthday hooray", tone: false },
    Emoji { name: "upside_down", hex: "1f643", keywords: "face silly sarcasm irony", tone: false },
    Emoji { name: "ghost", hex: "1f47b", keywords: "spooky halloween boo", tone: false },
    Emoji { name: "skull", hex: "1f480", keywords: "dead death bones", tone: false },
    Emoji { name: "alien", hex: "1f47d", keywords: "ufo space extraterrestrial", tone: false },
    Emoji { name: "robot", hex: "1f916", keywords: "machine computer bot", tone: false },
    Emoji { name: "poop", hex: "1f4a9", keywords: "pile smelly dung silly", tone: false },
    Emoji { name: "thumbsup", hex: "1f44d", keywords: "hand approve like yes plus one", tone: true },
    Emoji { name: "thumbsdown", hex: "1f44e", keywords: "hand disapprove dislike no", tone: true },
    Emoji { name: "wave", hex: "1f44b", keywords: "hand hello goodbye greeting", tone: true },
    Emoji { name: "clap", hex: "1f44f", keywords: "hands applause praise congrats", tone: true },
    Emoji { name: "ok_hand", hex: "1f44c", keywords: "hand perfect okay fingers", tone: true },
    Emoji { name: "pray", hex: "1f64f", keywords: "hands please hope thanks namaste", tone: true },
    Emoji { name: "muscle", hex: "1f4aa", keywords: "arm flex strong biceps", tone: true },
    Emoji { name: "point_up", hex: "261d", keywords: "hand finger direction attention", tone: true },
    Emoji { name: "raised_hands", hex: "1f64c", keywords: "hands hooray celebration praise", tone: true },
    Emoji { name: "heart", hex: "2764", keywords: "love like red valentine", tone: false },
    Emoji { name: "broken_heart", hex: "1f494", keywords: "love sad breakup", tone: false },
    Emoji { name: "fire", hex: "1f525", keywords: "hot lit flame burn", tone: false },
    Emoji { name: "star", hex: "2b50", keywords: "night sky yellow award", tone: false },
    Emoji { name: "sparkles", hex: "2728", keywords: "shiny magic clean new", tone: false },
    Emoji { name: "tada", hex: "1f389", keywords: "party popper celebration congrats", tone: false },
    Emoji { name: "rocket", hex: "1f680", keywords: "launch space ship fast", tone: false },
    Emoji { name: "eyes", hex: "1f440", keywords: "look see watch suspicious", tone: false },
    Emoji { name: "hundred", hex: "1f4af", keywords: "100 score perfect points", tone: false },
    Emoji { name: "check", hex: "2705", keywords: "mark done yes green tick", tone: false },
    Emoji { name: "cross", hex: "274c", keywords: "mark no wrong red", tone: false },
    Emoji { name: "warning", hex: "26a0", keywords: "caution alert danger", tone: false },
    Emoji { name: "bulb", hex: "1f4a1", keywords: "light idea electric", tone: false },
    Emoji { name: "zzz", hex: "1f4a4", keywords: "sleep tired bed snore", tone: false },
    Emoji { name: "cat", hex: "1f431", keywords: "animal pet kitten meow", tone: false },
    Emoji { name: "dog", hex: "1f436", keywords: "animal pet puppy woof", tone: false },
    Emoji { name: "unicorn", hex: "1f984", keywords: "animal mythical horse rainbow", tone: false },
    Emoji { name: "pizza", hex: "1f355", keywords: "food slice cheese italian", tone: false },
    Emoji { name: "coffee", hex: "2615", keywords: "drink hot caffeine cup", tone: false },
    Emoji { name: "beer", hex: "1f37a", keywords: "drink mug pub cheers", tone: false },
    Emoji { name: "cake", hex: "1f382", keywords: "food birthday dessert candles", tone: false },
    Emoji { name: "soccer", hex: "26bd", keywords: "sport ball football", tone: false },
];

pub static EMOTICONS: &[Emoticon] = &[
    Emoticon { name: "shrug", chars: "¯\\_(ツ)_/¯", keywords: "dunno whatever idk" },
    Emoticon { name: "tableflip", chars: "(╯°□°）╯︵ ┻━┻", keywords: "anger rage flip desk" },
    Emoticon { name: "unflip", chars: "┬─┬ノ( º _ ºノ)", keywords: "table back calm restore" },
    Emoticon { name: "lenny", chars: "( ͡° ͜ʖ ͡°)", keywords: "smug suggestive face" },
    Emoticon { name: "disapproval", chars: "ಠ_ಠ", keywords: "look stare judging" },
    Emoticon { name: "happy", chars: "(◕‿◕)", keywords: "smile cute joy" },
    Emoticon { name: "sad", chars: "(︶︹︺)", keywords: "frown unhappy down" },
    Emoticon { name: "cry", chars: "(;´Д`)", keywords: "tears upset weep" },
    Emoticon { name: "wink_face", chars: ";-)", keywords: "flirt playful classic" },
    Emoticon { name: "smiley_face", chars: ":-)", keywords: "smile classic ascii" },
    Emoticon { name: "frowny_face", chars: ":-(", keywords: "sad classic ascii" },
    Emoticon { name: "hug", chars: "(づ｡◕‿‿◕｡)づ", keywords: "embrace cuddle cute" },
    Emoticon { name: "bear", chars: "ʕ•ᴥ•ʔ", keywords: "animal cute kuma" },
    Emoticon { name: "fight", chars: "(ง'̀-'́)ง", keywords: "ready punch determined" },
    Emoticon { name: "wave_arms", chars: "ヽ(・∀・)ﾉ", keywords: "excited hooray cheer" },
    Emoticon { name: "confused", chars: "(・_・ヾ", keywords: "puzzled huh what" },
    Emoticon { name: "sleepy", chars: "(∪｡∪)｡｡｡zzz", keywords: "tired sleep rest" },
    Emoticon { name: "magic", chars: "(ﾉ◕ヮ◕)ﾉ*:・ﾟ✧", keywords: "sparkle throw excited" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_emoji_renders_codepoints() {
        let grinning = find_by_hex("1f600").unwrap();
        assert_eq!(print_emoji(grinning, "yellow"), "😀");
    }

    #[test]
    fn print_emoji_appends_tone_modifier_when_capable() {
        let thumbsup = find_by_hex("1f44d").unwrap();
        assert_eq!(print_emoji(thumbsup, "dark"), "👍\u{1F3FF}");
        // unknown or default tones leave the glyph unmodified
        assert_eq!(print_emoji(thumbsup, "yellow"), "👍");
    }

    #[test]
    fn print_emoji_ignores_tone_for_untoned_emoji() {
        let fire = find_by_hex("1f525").unwrap();
        assert_eq!(print_emoji(fire, "light"), "🔥");
    }

    #[test]
    fn candidate_matches_on_name_and_keywords() {
        let grinning = Candidate::Emoji(find_by_hex("1f600").unwrap());
        assert!(matches_filter(&grinning, "grin"));
        assert!(matches_filter(&grinning, "happy"));
        assert!(!matches_filter(&grinning, "rocket"));
    }

    #[test]
    fn emoticon_glyph_is_literal() {
        let shrug = Candidate::Emoticon(&EMOTICONS[0]);
        assert_eq!(shrug.glyph("dark"), "¯\\_(ツ)_/¯");
    }
}
