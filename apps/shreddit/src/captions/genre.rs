//! Music genres for themed memes.
//!
//! Each genre carries a personality template that shapes the caption prompt,
//! plus the subreddits and search terms used to find pictures for it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Rock,
    Metal,
    Pop,
    HipHop,
    Jazz,
    Blues,
    Country,
    Electronic,
    Classical,
    Reggae,
    Punk,
    RnB,
    Soul,
    Folk,
    Indie,
    Techno,
    Disco,
    Alternative,
    Funk,
    Grunge,
}

/// Prompt personality and image-search hints for a genre.
#[derive(Debug, Clone)]
pub struct GenrePersonality {
    pub persona: &'static str,
    pub humour: &'static str,
    pub topics: Vec<&'static str>,
    pub subreddits: Vec<&'static str>,
    pub search_terms: Vec<&'static str>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown genre '{0}' (run `shreddit genres` for the list)")]
pub struct UnknownGenre(pub String);

impl Genre {
    pub const ALL: [Genre; 20] = [
        Genre::Rock,
        Genre::Metal,
        Genre::Pop,
        Genre::HipHop,
        Genre::Jazz,
        Genre::Blues,
        Genre::Country,
        Genre::Electronic,
        Genre::Classical,
        Genre::Reggae,
        Genre::Punk,
        Genre::RnB,
        Genre::Soul,
        Genre::Folk,
        Genre::Indie,
        Genre::Techno,
        Genre::Disco,
        Genre::Alternative,
        Genre::Funk,
        Genre::Grunge,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Genre::Rock => "Rock",
            Genre::Metal => "Metal",
            Genre::Pop => "Pop",
            Genre::HipHop => "Hip Hop",
            Genre::Jazz => "Jazz",
            Genre::Blues => "Blues",
            Genre::Country => "Country",
            Genre::Electronic => "Electronic",
            Genre::Classical => "Classical",
            Genre::Reggae => "Reggae",
            Genre::Punk => "Punk",
            Genre::RnB => "R&B",
            Genre::Soul => "Soul",
            Genre::Folk => "Folk",
            Genre::Indie => "Indie",
            Genre::Techno => "Techno",
            Genre::Disco => "Disco",
            Genre::Alternative => "Alternative",
            Genre::Funk => "Funk",
            Genre::Grunge => "Grunge",
        }
    }

    pub fn personality(&self) -> GenrePersonality {
        match self {
            Genre::Rock => GenrePersonality {
                persona: "a veteran rock roadie who has seen every stadium tour since 1975",
                humour: "loud, nostalgic and a little self-deprecating",
                topics: vec!["guitar solos", "air guitar", "dad rock", "broken strings"],
                subreddits: vec!["rock", "ClassicRock", "AlternativeRock"],
                search_terms: vec!["rock", "guitar", "concert"],
            },
            Genre::Metal => GenrePersonality {
                persona: "a corpse-painted metalhead who is secretly very polite",
                humour: "over-the-top brutal with a wholesome twist",
                topics: vec!["breakdowns", "unreadable band logos", "mosh pits", "blast beats"],
                subreddits: vec!["Metal", "MetalMemes", "metalcore"],
                search_terms: vec!["metal", "headbang", "mosh"],
            },
            Genre::Pop => GenrePersonality {
                persona: "a chronically online pop stan",
                humour: "dramatic, meme-literate and full of stan-twitter slang",
                topics: vec!["album drops", "chart battles", "catchy hooks", "tour tickets"],
                subreddits: vec!["popheads", "Music"],
                search_terms: vec!["pop", "pop star", "music video"],
            },
            Genre::HipHop => GenrePersonality {
                persona: "a hip hop head who still buys physical mixtapes",
                humour: "confident wordplay and braggadocio",
                topics: vec!["beefs", "producer tags", "sneakers", "album delays"],
                subreddits: vec!["hiphopheads", "HipHopImages", "Rap"],
                search_terms: vec!["hip hop", "rapper", "mic"],
            },
            Genre::Jazz => GenrePersonality {
                persona: "a jazz cat who insists every wrong note was intentional",
                humour: "dry, smug and improvised",
                topics: vec!["odd time signatures", "endless solos", "smoky clubs", "saxophones"],
                subreddits: vec!["Jazz", "JazzPiano", "JazzGuitar"],
                search_terms: vec!["jazz", "saxophone", "bebop"],
            },
            Genre::Blues => GenrePersonality {
                persona: "an old bluesman on a porch who has lost everything twice",
                humour: "melancholic understatement",
                topics: vec!["twelve bars", "lost loves", "crossroads", "bent notes"],
                subreddits: vec!["Blues", "BluesGuitarist"],
                search_terms: vec!["blues", "slide guitar", "harmonica"],
            },
            Genre::Country => GenrePersonality {
                persona: "a country singer whose truck, dog and heart are all broken",
                humour: "folksy storytelling with a twang",
                topics: vec!["pickup trucks", "cowboy boots", "heartbreak", "small towns"],
                subreddits: vec!["country", "CountryMusic"],
                search_terms: vec!["country music", "cowboy", "banjo"],
            },
            Genre::Electronic => GenrePersonality {
                persona: "a bedroom producer with forty unfinished projects",
                humour: "nerdy synth jokes and drop anticipation",
                topics: vec!["the drop", "synthesizers", "sidechain", "festival sets"],
                subreddits: vec!["electronicmusic", "EDM", "aves"],
                search_terms: vec!["edm", "dj", "festival"],
            },
            Genre::Classical => GenrePersonality {
                persona: "a conservatory student who judges everyone's tempo",
                humour: "refined, snobbish and full of composer in-jokes",
                topics: vec!["Beethoven", "orchestra tuning", "clapping between movements", "violas"],
                subreddits: vec!["classicalmusic", "ClassicalMemes"],
                search_terms: vec!["orchestra", "symphony", "piano"],
            },
            Genre::Reggae => GenrePersonality {
                persona: "a laid-back reggae selector who is never in a hurry",
                humour: "chill, sunny and unbothered",
                topics: vec!["offbeat skanks", "bass lines", "beach sound systems", "good vibes"],
                subreddits: vec!["reggae", "Dub"],
                search_terms: vec!["reggae", "sound system", "dub"],
            },
            Genre::Punk => GenrePersonality {
                persona: "a crust punk who knows exactly three chords and resents the third",
                humour: "snotty, anti-establishment and DIY",
                topics: vec!["three chords", "selling out", "basement shows", "safety pins"],
                subreddits: vec!["punk", "PunkRock", "FolkPunk"],
                search_terms: vec!["punk", "mohawk", "basement show"],
            },
            Genre::RnB => GenrePersonality {
                persona: "a smooth R&B crooner who sings every sentence",
                humour: "romantic, dramatic and full of runs",
                topics: vec!["vocal runs", "slow jams", "late-night texts", "falsetto"],
                subreddits: vec!["rnb", "Soulies"],
                search_terms: vec!["r&b", "singer", "slow jam"],
            },
            Genre::Soul => GenrePersonality {
                persona: "a soul diva from the Motown era",
                humour: "warm, sassy and full of heart",
                topics: vec!["horn sections", "vinyl crackle", "big voices", "heartache"],
                subreddits: vec!["soulmusic", "Motown"],
                search_terms: vec!["soul", "motown", "vinyl"],
            },
            Genre::Folk => GenrePersonality {
                persona: "a travelling folk singer with a banjo and strong opinions about tea",
                humour: "gentle, wholesome and a bit earnest",
                topics: vec!["campfires", "banjos", "beards", "protest songs"],
                subreddits: vec!["folk", "IndieFolk"],
                search_terms: vec!["folk", "acoustic", "banjo"],
            },
            Genre::Indie => GenrePersonality {
                persona: "an indie kid who liked the band before they were cool",
                humour: "ironic and gatekeepy",
                topics: vec!["vinyl pressings", "obscure B-sides", "tote bags", "small venues"],
                subreddits: vec!["indieheads", "indie"],
                search_terms: vec!["indie", "vinyl", "gig"],
            },
            Genre::Techno => GenrePersonality {
                persona: "a Berlin techno regular who has not seen daylight since Friday",
                humour: "deadpan and repetitive, much like the kick drum",
                topics: vec!["four-on-the-floor", "warehouse raves", "door policies", "black clothing"],
                subreddits: vec!["Techno", "DJs"],
                search_terms: vec!["techno", "warehouse", "rave"],
            },
            Genre::Disco => GenrePersonality {
                persona: "a disco diva who never left 1978",
                humour: "glamorous, camp and full of sparkle",
                topics: vec!["mirror balls", "platform shoes", "dance floors", "bell-bottoms"],
                subreddits: vec!["disco", "70s"],
                search_terms: vec!["disco", "mirror ball", "dance floor"],
            },
            Genre::Alternative => GenrePersonality {
                persona: "an alt-rock fan who cried at every festival headliner",
                humour: "angsty but self-aware",
                topics: vec!["radio edits", "festival mud", "emo phases", "eyeliner"],
                subreddits: vec!["AlternativeRock", "altrock"],
                search_terms: vec!["alternative", "alt rock", "festival"],
            },
            Genre::Funk => GenrePersonality {
                persona: "a funk bassist who thinks every song needs more slap",
                humour: "groovy, cheeky and full of swagger",
                topics: vec!["slap bass", "the one", "horn stabs", "wah pedals"],
                subreddits: vec!["funk", "Bass"],
                search_terms: vec!["funk", "slap bass", "groove"],
            },
            Genre::Grunge => GenrePersonality {
                persona: "a Seattle grunge kid in a flannel shirt from 1993",
                humour: "sarcastic, gloomy and apathetic",
                topics: vec!["flannel", "distortion pedals", "rain", "MTV Unplugged"],
                subreddits: vec!["grunge", "90sAlternative", "Nirvana"],
                search_terms: vec!["grunge", "flannel", "90s rock"],
            },
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Genre {
    type Err = UnknownGenre;

    /// Case-insensitive; spaces, dashes, underscores and `&` are ignored, so
    /// "hip-hop", "HipHop", "r&b" and "rnb" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let genre = match key.as_str() {
            "rnb" | "rb" | "randb" => Genre::RnB,
            "hiphop" | "rap" => Genre::HipHop,
            "electronica" | "edm" => Genre::Electronic,
            "altrock" => Genre::Alternative,
            _ => Genre::ALL
                .into_iter()
                .find(|g| {
                    g.display_name()
                        .chars()
                        .filter(|c| c.is_ascii_alphanumeric())
                        .map(|c| c.to_ascii_lowercase())
                        .eq(key.chars())
                })
                .ok_or_else(|| UnknownGenre(s.trim().to_string()))?,
        };
        Ok(genre)
    }
}
