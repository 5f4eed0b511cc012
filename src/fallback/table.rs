//! Static locale-keyed reply table.
//!
//! Questions are stored already normalized (trimmed, lowercase). Lookups
//! normalize the input the same way and require an exact match.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Supported locales. The first entry is the fallback.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "es", "pt", "fr"];

/// Canned replies and upsell text for one locale.
#[derive(Debug)]
pub struct LocaleTable {
    pub upsell: &'static str,
    faq: HashMap<&'static str, &'static str>,
}

impl LocaleTable {
    fn new(upsell: &'static str, entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            upsell,
            faq: entries.iter().copied().collect(),
        }
    }

    /// Exact match on a normalized question.
    pub fn answer(&self, normalized: &str) -> Option<&'static str> {
        self.faq.get(normalized).copied()
    }

    pub fn len(&self) -> usize {
        self.faq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faq.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = &&'static str> {
        self.faq.keys()
    }
}

static TABLES: Lazy<HashMap<&'static str, LocaleTable>> = Lazy::new(|| {
    let mut tables = HashMap::new();

    tables.insert(
        "en",
        LocaleTable::new(
            "The personal assistant is part of Premium. Upgrade to get answers tailored to your cycle, sleep and mood history.",
            &[
                ("how do i log my period?", "Open the Cycle tab, tap the calendar day your period started and choose \"Period\". You can add flow and symptoms on the same screen."),
                ("how do i track my sleep?", "Go to the Sleep tab and tap \"Add night\". Enter when you went to bed and woke up, then rate how rested you feel."),
                ("how do i log my mood?", "Tap the smiley on the Today screen, pick the mood that fits best and add a note if you like."),
                ("can i export my data?", "Yes. Go to Settings > Privacy > Export data and we will email you a file with all your entries."),
                ("how do i delete my account?", "Go to Settings > Account > Delete account. This permanently removes your data after a 14 day grace period."),
                ("how do i cancel my subscription?", "Subscriptions are managed in Settings > Subscription. You keep Premium until the end of the current billing period."),
            ],
        ),
    );

    tables.insert(
        "es",
        LocaleTable::new(
            "El asistente personal forma parte de Premium. Mejora tu plan para recibir respuestas adaptadas a tu ciclo, tu sueño y tu estado de ánimo.",
            &[
                ("¿cómo registro mi periodo?", "Abre la pestaña Ciclo, toca el día en que empezó tu periodo y elige \"Periodo\". Puedes añadir flujo y síntomas en la misma pantalla."),
                ("¿cómo registro mi sueño?", "Ve a la pestaña Sueño y toca \"Añadir noche\". Indica a qué hora te acostaste y te levantaste, y valora cómo descansaste."),
                ("¿cómo registro mi estado de ánimo?", "Toca la carita en la pantalla Hoy, elige el estado que mejor te describa y añade una nota si quieres."),
                ("¿puedo exportar mis datos?", "Sí. Ve a Ajustes > Privacidad > Exportar datos y te enviaremos un archivo por correo con todos tus registros."),
                ("¿cómo cancelo mi suscripción?", "Las suscripciones se gestionan en Ajustes > Suscripción. Conservas Premium hasta el final del periodo de facturación."),
            ],
        ),
    );

    tables.insert(
        "pt",
        LocaleTable::new(
            "O assistente pessoal faz parte do Premium. Faça o upgrade para receber respostas personalizadas para o seu ciclo, sono e humor.",
            &[
                ("como registro minha menstruação?", "Abra a aba Ciclo, toque no dia em que a menstruação começou e escolha \"Menstruação\". Você pode adicionar fluxo e sintomas na mesma tela."),
                ("como registro meu sono?", "Vá até a aba Sono e toque em \"Adicionar noite\". Informe quando dormiu e acordou e avalie como se sente descansada."),
                ("como registro meu humor?", "Toque no emoji da tela Hoje, escolha o humor que mais combina com você e adicione uma nota se quiser."),
                ("posso exportar meus dados?", "Sim. Vá em Configurações > Privacidade > Exportar dados e enviaremos um arquivo por e-mail com todos os seus registros."),
                ("como cancelo minha assinatura?", "As assinaturas são gerenciadas em Configurações > Assinatura. Você mantém o Premium até o fim do período atual."),
            ],
        ),
    );

    tables.insert(
        "fr",
        LocaleTable::new(
            "L'assistant personnel fait partie de Premium. Passez à Premium pour obtenir des réponses adaptées à votre cycle, votre sommeil et votre humeur.",
            &[
                ("comment enregistrer mes règles ?", "Ouvrez l'onglet Cycle, touchez le jour où vos règles ont commencé et choisissez « Règles ». Vous pouvez ajouter le flux et les symptômes sur le même écran."),
                ("comment suivre mon sommeil ?", "Allez dans l'onglet Sommeil et touchez « Ajouter une nuit ». Indiquez l'heure du coucher et du réveil, puis notez votre niveau de repos."),
                ("comment enregistrer mon humeur ?", "Touchez le smiley sur l'écran Aujourd'hui, choisissez l'humeur qui vous correspond et ajoutez une note si vous le souhaitez."),
                ("puis-je exporter mes données ?", "Oui. Allez dans Réglages > Confidentialité > Exporter les données et nous vous enverrons un fichier par e-mail."),
                ("comment résilier mon abonnement ?", "Les abonnements se gèrent dans Réglages > Abonnement. Vous gardez Premium jusqu'à la fin de la période en cours."),
            ],
        ),
    );

    tables
});

/// Reduce a locale tag to a supported language: `pt-BR` -> `pt`,
/// `fr_CA` -> `fr`, unknown -> `en`.
pub fn normalize_locale(tag: &str) -> &'static str {
    let language = tag
        .trim()
        .split(&['-', '_'][..])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| *supported == language)
        .unwrap_or(SUPPORTED_LOCALES[0])
}

/// Normalize user input for lookup: trim, collapse inner whitespace, lowercase.
pub fn normalize_question(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Table for a locale tag, falling back to English.
pub fn table_for(locale: &str) -> &'static LocaleTable {
    let key = normalize_locale(locale);
    match TABLES.get(key) {
        Some(table) => table,
        None => &TABLES["en"],
    }
}
