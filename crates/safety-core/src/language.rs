//! Local language lookup and tourist phrasebooks

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub language: &'static str,
    pub code: &'static str,
    pub script: &'static str,
    pub greeting: &'static str,
    pub thank_you: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phrasebook {
    pub where_is: &'static str,
    pub how_much: &'static str,
    pub water: &'static str,
    pub food: &'static str,
    pub help: &'static str,
    pub bathroom: &'static str,
    pub taxi: &'static str,
    pub hotel: &'static str,
}

const fn lang(
    language: &'static str,
    code: &'static str,
    script: &'static str,
    greeting: &'static str,
    thank_you: &'static str,
) -> LanguageInfo {
    LanguageInfo { language, code, script, greeting, thank_you }
}

const HINDI: LanguageInfo = lang("Hindi", "hi", "Devanagari", "Namaste", "Dhanyavaad");
const TAMIL: LanguageInfo = lang("Tamil", "ta", "Tamil", "Vanakkam", "Nandri");
const MALAYALAM: LanguageInfo = lang("Malayalam", "ml", "Malayalam", "Namaskaram", "Nanni");
const KANNADA: LanguageInfo = lang("Kannada", "kn", "Kannada", "Namaskara", "Dhanyavaada");
const TELUGU: LanguageInfo = lang("Telugu", "te", "Telugu", "Namaste", "Dhanyavaadulu");
const ENGLISH: LanguageInfo = lang("English", "en", "Latin", "Hello", "Thank you");
const MANDARIN: LanguageInfo = lang("Mandarin Chinese", "zh", "Chinese", "Ni hao", "Xie xie");
const ARABIC: LanguageInfo = lang("Arabic", "ar", "Arabic", "Marhaba", "Shukran");
const PORTUGUESE: LanguageInfo = lang("Portuguese", "pt", "Latin", "Olá", "Obrigado");
const ITALIAN: LanguageInfo = lang("Italian", "it", "Latin", "Ciao", "Grazie");
const GERMAN: LanguageInfo = lang("German", "de", "Latin", "Hallo", "Danke");
const SPANISH: LanguageInfo = lang("Spanish", "es", "Latin", "Hola", "Gracias");

/// Searched in order; the first substring hit wins
static LOCAL_LANGUAGES: &[(&str, LanguageInfo)] = &[
    // India
    ("agra", HINDI),
    ("delhi", HINDI),
    ("mumbai", lang("Hindi/Marathi", "hi/mr", "Devanagari", "Namaste", "Dhanyavaad")),
    ("kolkata", lang("Bengali", "bn", "Bengali", "Nomoskar", "Dhonyobad")),
    ("chennai", TAMIL),
    ("bangalore", KANNADA),
    ("hyderabad", TELUGU),
    ("pune", lang("Marathi", "mr", "Devanagari", "Namaste", "Dhanyavaad")),
    ("ahmedabad", lang("Gujarati", "gu", "Gujarati", "Namaste", "Dhanyavaad")),
    ("jaipur", lang("Hindi/Rajasthani", "hi", "Devanagari", "Namaste", "Dhanyavaad")),
    ("tamil nadu", TAMIL),
    ("kerala", MALAYALAM),
    ("karnataka", KANNADA),
    ("andhra pradesh", TELUGU),
    ("telangana", TELUGU),
    ("coimbatore", TAMIL),
    ("madurai", TAMIL),
    ("tiruchirappalli", TAMIL),
    ("salem", TAMIL),
    ("tirunelveli", TAMIL),
    ("thiruvananthapuram", MALAYALAM),
    ("kochi", MALAYALAM),
    ("kannur", MALAYALAM),
    ("kollam", MALAYALAM),
    ("thrissur", MALAYALAM),
    ("mysore", KANNADA),
    ("mangalore", KANNADA),
    ("hubli", KANNADA),
    ("belgaum", KANNADA),
    ("visakhapatnam", TELUGU),
    ("vijayawada", TELUGU),
    ("guntur", TELUGU),
    ("nellore", TELUGU),
    ("warangal", TELUGU),
    ("nizamabad", TELUGU),
    ("karimnagar", TELUGU),
    // International
    ("paris", lang("French", "fr", "Latin", "Bonjour", "Merci")),
    ("london", ENGLISH),
    ("tokyo", lang("Japanese", "ja", "Japanese", "Konnichiwa", "Arigatou")),
    ("beijing", MANDARIN),
    ("moscow", lang("Russian", "ru", "Cyrillic", "Privet", "Spasibo")),
    ("cairo", ARABIC),
    ("istanbul", lang("Turkish", "tr", "Latin", "Merhaba", "Teşekkürler")),
    ("rio", PORTUGUESE),
    ("sydney", ENGLISH),
    ("dubai", ARABIC),
    ("rome", ITALIAN),
    ("barcelona", lang("Spanish/Catalan", "es/ca", "Latin", "Hola", "Gracias")),
    ("amsterdam", lang("Dutch", "nl", "Latin", "Hallo", "Dank u")),
    ("venice", ITALIAN),
    ("berlin", GERMAN),
    ("prague", lang("Czech", "cs", "Latin", "Ahoj", "Děkuji")),
    ("vienna", GERMAN),
    ("bangkok", lang("Thai", "th", "Thai", "Sawatdee", "Khop khun")),
    ("singapore", lang("English/Malay/Chinese", "en/ms/zh", "Latin/Chinese", "Hello", "Thank you")),
    ("seoul", lang("Korean", "ko", "Korean", "Annyeonghaseyo", "Gamsahamnida")),
    ("hong kong", lang("Cantonese/English", "zh/en", "Chinese/Latin", "Nei ho", "M'goi")),
    ("shanghai", MANDARIN),
    ("kuala lumpur", lang("Malay", "ms", "Latin", "Selamat pagi", "Terima kasih")),
    ("los angeles", ENGLISH),
    ("mexico city", SPANISH),
    ("toronto", ENGLISH),
    ("sao paulo", PORTUGUESE),
    ("buenos aires", SPANISH),
    ("jerusalem", lang("Hebrew/Arabic", "he/ar", "Hebrew/Arabic", "Shalom/Marhaban", "Todah/Shukran")),
    ("tel aviv", lang("Hebrew", "he", "Hebrew", "Shalom", "Todah")),
    ("riyadh", ARABIC),
    ("cape town", lang("English/Afrikaans", "en/af", "Latin", "Hello", "Thank you")),
    ("johannesburg", lang("English/Zulu", "en/zu", "Latin", "Hello", "Thank you")),
    ("nairobi", lang("Swahili/English", "sw/en", "Latin", "Hujambo", "Asante")),
    ("melbourne", ENGLISH),
    ("auckland", lang("English/Maori", "en/mi", "Latin", "Hello", "Thank you")),
];

/// Country names and demonyms mapped to a representative city
static LOCATION_ALIASES: &[(&str, &str)] = &[
    ("japan", "tokyo"),
    ("japanese", "tokyo"),
    ("india", "delhi"),
    ("indian", "delhi"),
    ("france", "paris"),
    ("french", "paris"),
    ("china", "beijing"),
    ("chinese", "beijing"),
    ("russia", "moscow"),
    ("russian", "moscow"),
    ("turkey", "istanbul"),
    ("turkish", "istanbul"),
    ("egypt", "cairo"),
    ("egyptian", "cairo"),
    ("brazil", "sao paulo"),
    ("brazilian", "sao paulo"),
    ("uae", "dubai"),
    ("united arab emirates", "dubai"),
    ("arab", "dubai"),
    ("australia", "sydney"),
    ("australian", "sydney"),
    ("uk", "london"),
    ("united kingdom", "london"),
    ("british", "london"),
    ("usa", "new york"),
    ("united states", "new york"),
    ("america", "new york"),
    ("american", "new york"),
    ("italy", "rome"),
    ("italian", "rome"),
    ("spain", "barcelona"),
    ("spanish", "barcelona"),
    ("netherlands", "amsterdam"),
    ("dutch", "amsterdam"),
    ("germany", "berlin"),
    ("german", "berlin"),
    ("czech republic", "prague"),
    ("czech", "prague"),
    ("austria", "vienna"),
    ("austrian", "vienna"),
    ("thailand", "bangkok"),
    ("thai", "bangkok"),
    ("south korea", "seoul"),
    ("korean", "seoul"),
    ("malaysia", "kuala lumpur"),
    ("malay", "kuala lumpur"),
    ("mexico", "mexico city"),
    ("mexican", "mexico city"),
    ("canada", "toronto"),
    ("canadian", "toronto"),
    ("argentina", "buenos aires"),
    ("argentinian", "buenos aires"),
    ("israel", "jerusalem"),
    ("hebrew", "jerusalem"),
    ("saudi arabia", "riyadh"),
    ("saudi", "riyadh"),
    ("south africa", "cape town"),
    ("african", "cape town"),
    ("kenya", "nairobi"),
    ("kenyan", "nairobi"),
    ("new zealand", "auckland"),
    ("zealand", "auckland"),
];

static LANGUAGE_KEYWORDS: &[(&str, &str)] = &[
    ("hindi", "delhi"),
    ("marathi", "mumbai"),
    ("bengali", "kolkata"),
    ("tamil", "chennai"),
    ("telugu", "hyderabad"),
    ("kannada", "bangalore"),
    ("gujarati", "ahmedabad"),
    ("rajasthani", "jaipur"),
    ("french", "paris"),
    ("english", "london"),
    ("japanese", "tokyo"),
    ("mandarin", "beijing"),
    ("chinese", "beijing"),
    ("russian", "moscow"),
    ("arabic", "dubai"),
    ("turkish", "istanbul"),
    ("portuguese", "rio"),
];

const fn phrases(
    where_is: &'static str,
    how_much: &'static str,
    water: &'static str,
    food: &'static str,
    help: &'static str,
    bathroom: &'static str,
    taxi: &'static str,
    hotel: &'static str,
) -> Phrasebook {
    Phrasebook { where_is, how_much, water, food, help, bathroom, taxi, hotel }
}

pub const ENGLISH_PHRASES: Phrasebook =
    phrases("Where is", "How much", "Water", "Food", "Help", "Bathroom", "Taxi", "Hotel");

static TOURIST_PHRASES: &[(&str, Phrasebook)] = &[
    ("hi", phrases("Kahaan hai", "Kitna hai", "Paani", "Khana", "Madad", "Bathroom", "Taxi", "Hotel")),
    ("fr", phrases("Où est", "Combien", "Eau", "Nourriture", "Aide", "Toilettes", "Taxi", "Hôtel")),
    ("ja", phrases("Doko desu ka", "Ikura desu ka", "Mizu", "Tabemono", "Tasukete", "Toire", "Takushī", "Hoteru")),
    ("zh", phrases("Zài nǎlǐ", "Duōshǎo qián", "Shuǐ", "Shíwù", "Bāngmáng", "Cèsuǒ", "Chūzūchē", "Fàndiàn")),
    ("ar", phrases("Ayna", "Kam athaman", "Maa", "Taam", "Musaeada", "Hammam", "Taxi", "Funduq")),
    ("it", phrases("Dove è", "Quanto costa", "Acqua", "Cibo", "Aiuto", "Bagno", "Taxi", "Hotel")),
    ("es", phrases("Dónde está", "Cuánto cuesta", "Agua", "Comida", "Ayuda", "Baño", "Taxi", "Hotel")),
    ("nl", phrases("Waar is", "Hoeveel kost", "Water", "Eten", "Help", "Toilet", "Taxi", "Hotel")),
    ("de", phrases("Wo ist", "Wie viel kostet", "Wasser", "Essen", "Hilfe", "Toilette", "Taxi", "Hotel")),
    ("th", phrases("Yù tîi nǎi", "Tao rai", "Nám", "A-hǎan", "Chûay dâi mǎi", "Hông nám", "Tæksi", "Rong ræm")),
    ("ko", phrases("Eodisseoyo", "Eolmayeoyo", "Mul", "Eumsik", "Dowajuseyo", "Hwajangsil", "Taeksi", "Hotel")),
    ("pt", phrases("Onde fica", "Quanto custa", "Água", "Comida", "Ajuda", "Banheiro", "Táxi", "Hotel")),
    ("he", phrases("Eifo", "Kama ze oleh", "Mayim", "Ochla", "Ezra", "Sherutim", "Mona", "Malon")),
    ("cs", phrases("Kde je", "Kolik stojí", "Voda", "Jídlo", "Pomoc", "Toaleta", "Taxi", "Hotel")),
    ("ms", phrases("Di mana", "Berapa harganya", "Air", "Makanan", "Tolong", "Tandas", "Teksi", "Hotel")),
    ("sw", phrases("Iko wapi", "Ni bei gani", "Maji", "Chakula", "Msaada", "Choo", "Teksi", "Hoteli")),
    ("mi", phrases("Kei hea", "E hia te utu", "Wai", "Kai", "Awhina", "Wharepaku", "Tākihi", "Hōtēra")),
    ("ta", phrases("Enga irukku", "Evalavu", "Thanni", "Sapadu", "Udavi", "Kachavadi", "Taxi", "Hotel")),
    ("te", phrases("Ekkada undi", "Enta", "Neellu", "Bhojanam", "Sahayam", "Sulabh kendram", "Taxi", "Hotel")),
    ("kn", phrases("Ellide", "Eshtu", "Neeru", "Oota", "Sahaya", "Sulabh kendra", "Taxi", "Hotel")),
    ("ml", phrases("Evide", "Etta", "Vellam", "Bhojanam", "Sahayam", "Sulabh kendram", "Taxi", "Hotel")),
];

fn city(name: &str) -> Option<LanguageInfo> {
    LOCAL_LANGUAGES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, info)| *info)
}

/// Resolve the local language for a free-form place name.
///
/// Aliases are applied first, then an exact city match, then a substring
/// match in either direction, then language keywords. Unknown places get English.
pub fn location_language(location: &str) -> LanguageInfo {
    let mut name = location.trim().to_lowercase();

    if let Some((_, alias)) = LOCATION_ALIASES.iter().find(|(key, _)| *key == name) {
        name = alias.to_string();
    }

    if let Some(info) = city(&name) {
        return info;
    }

    if let Some((_, info)) = LOCAL_LANGUAGES
        .iter()
        .find(|(key, _)| name.contains(key) || key.contains(name.as_str()))
    {
        return *info;
    }

    LANGUAGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .and_then(|(_, c)| city(c))
        .unwrap_or(ENGLISH)
}

/// Phrasebook for a language code; compound codes like `hi/mr` use the first part
pub fn tourist_phrases(code: &str) -> Phrasebook {
    let primary = code.split('/').next().unwrap_or(code);
    TOURIST_PHRASES
        .iter()
        .find(|(key, _)| *key == primary)
        .map(|(_, p)| *p)
        .unwrap_or(ENGLISH_PHRASES)
}
