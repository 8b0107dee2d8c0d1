//! Offline fallback messages and payload synthesis.
//!
//! When the network is unreachable for an API call, the proxy answers
//! locally with a localized offline notice instead of surfacing an error.
//! The message table is a closed set of ten ISO 639-1 codes; any code
//! outside the set resolves to the default language.

use serde::{Deserialize, Serialize};

use crate::request::InterceptedRequest;

/// Default language used whenever detection fails or a code is unknown.
pub const DEFAULT_LANGUAGE: &str = "fr";

/// Localized offline notices, keyed by ISO 639-1 code.
const MESSAGES: &[(&str, &str)] = &[
    (
        "fr",
        "Vous êtes actuellement hors ligne. Veuillez vérifier votre connexion Internet et réessayer. Les informations en cache sont disponibles mais les nouvelles questions nécessitent une connexion Internet.",
    ),
    (
        "en",
        "You are currently offline. Please check your internet connection and try again. Cached information is available but new questions require an internet connection.",
    ),
    (
        "es",
        "Actualmente estás sin conexión. Verifica tu conexión a Internet e inténtalo de nuevo. La información en caché está disponible, pero las nuevas preguntas requieren una conexión a Internet.",
    ),
    (
        "ar",
        "أنت غير متصل حالياً. يرجى التحقق من اتصالك بالإنترنت والمحاولة مرة أخرى. المعلومات المخزنة مؤقتاً متاحة ولكن الأسئلة الجديدة تتطلب اتصالاً بالإنترنت.",
    ),
    (
        "pt",
        "Você está atualmente offline. Verifique sua conexão com a internet e tente novamente. As informações em cache estão disponíveis, mas novas perguntas requerem uma conexão com a internet.",
    ),
    (
        "de",
        "Sie sind derzeit offline. Überprüfen Sie Ihre Internetverbindung und versuchen Sie es erneut. Zwischengespeicherte Informationen sind verfügbar, aber neue Fragen erfordern eine Internetverbindung.",
    ),
    (
        "it",
        "Attualmente sei offline. Controlla la tua connessione internet e riprova. Le informazioni memorizzate nella cache sono disponibili ma le nuove domande richiedono una connessione internet.",
    ),
    ("zh", "您当前处于离线状态。请检查您的互联网连接并重试。缓存信息可用，但新问题需要互联网连接。"),
    (
        "ru",
        "Вы сейчас не в сети. Проверьте подключение к Интернету и попробуйте снова. Кэшированная информация доступна, но новые вопросы требуют подключения к Интернету.",
    ),
    (
        "ja",
        "現在オフラインです。インターネット接続を確認して再試行してください。キャッシュされた情報は利用できますが、新しい質問にはインターネット接続が必要です。",
    ),
];

/// Localized offline notice for a language code, defaulting to French
/// for any code outside the table.
pub fn offline_message(language: &str) -> &'static str {
    MESSAGES
        .iter()
        .find(|(code, _)| *code == language)
        .or_else(|| MESSAGES.iter().find(|(code, _)| *code == DEFAULT_LANGUAGE))
        .map(|(_, message)| *message)
        .unwrap_or_default()
}

/// Resolve the language for a request.
///
/// Known gap: this is a placeholder that always resolves to the default.
/// Detecting the real language would require parsing the request body,
/// which the interception layer never reads. The observable contract
/// (always the default) is load-bearing for the fallback payload tests
/// and must hold until a body parser exists.
pub fn detect_language(_request: &InterceptedRequest) -> &'static str {
    DEFAULT_LANGUAGE
}

/// Locally synthesized substitute for an API response.
///
/// Serialized as `{"answer": ..., "detected_language": ...}` with an
/// HTTP 200 status so callers never observe a failed API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflinePayload {
    pub answer: String,
    pub detected_language: String,
}

impl OfflinePayload {
    /// Build the payload for a request the network could not serve.
    pub fn for_request(request: &InterceptedRequest) -> Self {
        let language = detect_language(request);
        Self { answer: offline_message(language).to_string(), detected_language: language.to_string() }
    }
}
