//! Kokoro v1.0 voice registry.
//!
//! Voice names are what episode documents bind to roles. Each voice carries the
//! speaker id Kokoro expects and the language it was trained on, which decides
//! whether a voice can read a given language tag and which lexicon it needs.

/// Language family of a Kokoro voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceLanguage {
    AmericanEnglish,
    BritishEnglish,
    Spanish,
    French,
    Hindi,
    Italian,
    Japanese,
    BrazilianPortuguese,
    Mandarin,
}

/// Every language, in the order voices are listed.
const LANGUAGES: &[VoiceLanguage] = &[
    VoiceLanguage::AmericanEnglish,
    VoiceLanguage::BritishEnglish,
    VoiceLanguage::Spanish,
    VoiceLanguage::French,
    VoiceLanguage::Hindi,
    VoiceLanguage::Italian,
    VoiceLanguage::Japanese,
    VoiceLanguage::BrazilianPortuguese,
    VoiceLanguage::Mandarin,
];

impl VoiceLanguage {
    /// Human-readable language name.
    pub fn name(self) -> &'static str {
        match self {
            VoiceLanguage::AmericanEnglish => "American English",
            VoiceLanguage::BritishEnglish => "British English",
            VoiceLanguage::Spanish => "Spanish",
            VoiceLanguage::French => "French",
            VoiceLanguage::Hindi => "Hindi",
            VoiceLanguage::Italian => "Italian",
            VoiceLanguage::Japanese => "Japanese",
            VoiceLanguage::BrazilianPortuguese => "Portuguese BR",
            VoiceLanguage::Mandarin => "Mandarin Chinese",
        }
    }

    /// espeak-ng language code.
    pub fn espeak_code(self) -> &'static str {
        match self {
            VoiceLanguage::AmericanEnglish => "en-us",
            VoiceLanguage::BritishEnglish => "en-gb",
            VoiceLanguage::Spanish => "es",
            VoiceLanguage::French => "fr-fr",
            VoiceLanguage::Hindi => "hi",
            VoiceLanguage::Italian => "it",
            VoiceLanguage::Japanese => "ja",
            VoiceLanguage::BrazilianPortuguese => "pt-br",
            VoiceLanguage::Mandarin => "cmn",
        }
    }

    /// Lexicon files bundled with the model for this language, if any.
    /// Languages without a lexicon are phonemized by espeak-ng instead.
    pub fn lexicons(self) -> &'static [&'static str] {
        match self {
            VoiceLanguage::AmericanEnglish => &["lexicon-us-en.txt"],
            VoiceLanguage::BritishEnglish => &["lexicon-gb-en.txt"],
            // Chinese text often carries English words
            VoiceLanguage::Mandarin => &["lexicon-us-en.txt", "lexicon-zh.txt"],
            _ => &[],
        }
    }

    /// Language code passed to Kokoro for voices without a lexicon.
    /// Reference: <https://github.com/k2-fsa/sherpa-onnx/blob/master/sherpa-onnx/csrc/offline-tts-kokoro-model-config.cc>
    pub fn espeak_lang(self) -> Option<&'static str> {
        match self {
            VoiceLanguage::Spanish => Some("es"),
            VoiceLanguage::French => Some("fr"),
            VoiceLanguage::Hindi => Some("hi"),
            VoiceLanguage::Italian => Some("it"),
            VoiceLanguage::Japanese => Some("ja"),
            VoiceLanguage::BrazilianPortuguese => Some("pt-br"),
            _ => None,
        }
    }

    /// Check whether a language tag from an episode document names this language.
    ///
    /// Accepts the espeak code (`en-us`), its primary subtag (`en`), the full name
    /// (`American English`) or its last word (`English`, `Chinese`), ignoring case.
    pub fn matches(self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase().replace('_', "-");
        if tag.is_empty() {
            return false;
        }

        let code = self.espeak_code();
        let name = self.name().to_lowercase();
        let primary = code.split('-').next().unwrap_or(code);
        let last_word = name.rsplit(' ').next().unwrap_or(name.as_str());

        // Mandarin is commonly tagged zh rather than cmn
        let alias = matches!(self, VoiceLanguage::Mandarin) && (tag == "zh" || tag.starts_with("zh-"));

        tag == code || tag == primary || tag == name || tag == last_word || alias
    }
}

/// Essential metadata for a TTS voice.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub speaker_id: i32,
    pub language: VoiceLanguage,
}

impl Voice {
    /// Check whether this voice can read text tagged with `language`.
    pub fn speaks(&self, language: &str) -> bool {
        self.language.matches(language)
    }
}

macro_rules! voice {
    ($name:literal, $id:literal, $lang:ident) => {
        ($name, Voice { speaker_id: $id, language: VoiceLanguage::$lang })
    };
}

/// All voices, sorted by name for binary search.
const VOICES: &[(&str, Voice)] = &[
    voice!("af_alloy", 0, AmericanEnglish),
    voice!("af_aoede", 1, AmericanEnglish),
    voice!("af_bella", 2, AmericanEnglish),
    voice!("af_heart", 3, AmericanEnglish),
    voice!("af_jessica", 4, AmericanEnglish),
    voice!("af_kore", 5, AmericanEnglish),
    voice!("af_nicole", 6, AmericanEnglish),
    voice!("af_nova", 7, AmericanEnglish),
    voice!("af_river", 8, AmericanEnglish),
    voice!("af_sarah", 9, AmericanEnglish),
    voice!("af_sky", 10, AmericanEnglish),
    voice!("am_adam", 11, AmericanEnglish),
    voice!("am_echo", 12, AmericanEnglish),
    voice!("am_eric", 13, AmericanEnglish),
    voice!("am_fenrir", 14, AmericanEnglish),
    voice!("am_liam", 15, AmericanEnglish),
    voice!("am_michael", 16, AmericanEnglish),
    voice!("am_onyx", 17, AmericanEnglish),
    voice!("am_puck", 18, AmericanEnglish),
    voice!("am_santa", 19, AmericanEnglish),
    voice!("bf_alice", 20, BritishEnglish),
    voice!("bf_emma", 21, BritishEnglish),
    voice!("bf_isabella", 22, BritishEnglish),
    voice!("bf_lily", 23, BritishEnglish),
    voice!("bm_daniel", 24, BritishEnglish),
    voice!("bm_fable", 25, BritishEnglish),
    voice!("bm_george", 26, BritishEnglish),
    voice!("bm_lewis", 27, BritishEnglish),
    voice!("ef_dora", 28, Spanish),
    voice!("em_alex", 29, Spanish),
    voice!("ff_siwis", 30, French),
    voice!("hf_alpha", 31, Hindi),
    voice!("hf_beta", 32, Hindi),
    voice!("hm_omega", 33, Hindi),
    voice!("hm_psi", 34, Hindi),
    voice!("if_sara", 35, Italian),
    voice!("im_nicola", 36, Italian),
    voice!("jf_alpha", 37, Japanese),
    voice!("jf_gongitsune", 38, Japanese),
    voice!("jf_nezumi", 39, Japanese),
    voice!("jf_tebukuro", 40, Japanese),
    voice!("jm_kumo", 41, Japanese),
    voice!("pf_dora", 42, BrazilianPortuguese),
    voice!("pm_alex", 43, BrazilianPortuguese),
    voice!("pm_santa", 44, BrazilianPortuguese),
    voice!("zf_xiaobei", 45, Mandarin),
    voice!("zf_xiaoni", 46, Mandarin),
    voice!("zf_xiaoxiao", 47, Mandarin),
    voice!("zf_xiaoyi", 48, Mandarin),
    voice!("zm_yunjian", 49, Mandarin),
    voice!("zm_yunxi", 50, Mandarin),
    voice!("zm_yunxia", 51, Mandarin),
    voice!("zm_yunyang", 52, Mandarin),
];

/// Get voice metadata by name.
///
/// Names are matched case-insensitively, so `AF_Heart` resolves like `af_heart`.
pub fn get_voice(name: &str) -> Option<&'static Voice> {
    let name = name.trim().to_lowercase();
    VOICES.binary_search_by_key(&name.as_str(), |(n, _)| n).ok().map(|idx| &VOICES[idx].1)
}

/// Print all available voices grouped by language.
pub fn print_voices() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Kokoro TTS v1.0 - {} Voices Across {} Languages", VOICES.len(), LANGUAGES.len());
    println!("═══════════════════════════════════════════════════════════════════");

    for lang in LANGUAGES {
        let mut lang_voices: Vec<_> = VOICES.iter().filter(|(_, v)| v.language == *lang).collect();
        lang_voices.sort_by_key(|(_, v)| v.speaker_id);

        println!("\n── {} ({} voices, language tag \"{}\") ──", lang.name(), lang_voices.len(), lang.espeak_code());
        println!("{:<15} {:<4}", "VOICE", "ID");
        println!("{}", "─".repeat(50));

        for (name, voice) in lang_voices {
            println!("{:<15} {:<4}", name, voice.speaker_id);
        }
    }

    println!("\n{}\n", "─".repeat(70));
    println!("Bind voices to roles in the episode document:");
    println!("  \"voices\": {{ \"host\": \"af_heart\", \"guest\": \"am_michael\" }}");
    println!();
    println!("or override them on the command line:");
    println!("  ./podcast-tts -e episode.json --host-voice bf_emma --guest-voice bm_george");
    println!();
}

/// Print detailed information about a specific voice.
pub fn print_voice_info(name: &str) -> anyhow::Result<()> {
    let voice = get_voice(name).ok_or_else(|| anyhow::anyhow!("Voice '{}' not found. Run with --list-voices to see available voices", name))?;

    println!();
    println!("Voice: {}", name);
    println!("{}", "─".repeat(40));
    println!("Speaker ID:    {}", voice.speaker_id);
    println!("Language:      {}", voice.language.name());
    println!("espeak code:   {}", voice.language.espeak_code());
    if voice.language.lexicons().is_empty() {
        println!("Lexicon:       none (espeak-ng phonemizer)");
    } else {
        println!("Lexicon:       {}", voice.language.lexicons().join(", "));
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voices_sorted_for_binary_search() {
        assert!(VOICES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_get_voice() {
        let voice = get_voice("af_bella").unwrap();
        assert_eq!(voice.speaker_id, 2);
        assert_eq!(voice.language, VoiceLanguage::AmericanEnglish);

        assert_eq!(get_voice("BF_Emma").unwrap().speaker_id, 21);
        assert!(get_voice("Serena").is_none());
    }

    #[test]
    fn test_language_matching() {
        let heart = get_voice("af_heart").unwrap();
        assert!(heart.speaks("English"));
        assert!(heart.speaks("en"));
        assert!(heart.speaks("en-US"));
        assert!(heart.speaks("american english"));
        assert!(!heart.speaks("en-gb"));
        assert!(!heart.speaks("Japanese"));

        let kumo = get_voice("jm_kumo").unwrap();
        assert!(kumo.speaks("Japanese"));
        assert!(kumo.speaks("ja"));

        let yunxi = get_voice("zm_yunxi").unwrap();
        assert!(yunxi.speaks("Chinese"));
        assert!(yunxi.speaks("zh"));
        assert!(yunxi.speaks("cmn"));
        assert!(!yunxi.speaks(""));
    }

    #[test]
    fn test_lexicon_selection() {
        assert_eq!(VoiceLanguage::BritishEnglish.lexicons(), &["lexicon-gb-en.txt"]);
        assert!(VoiceLanguage::Japanese.lexicons().is_empty());
        assert_eq!(VoiceLanguage::Japanese.espeak_lang(), Some("ja"));
        assert_eq!(VoiceLanguage::Mandarin.espeak_lang(), None);
    }
}
