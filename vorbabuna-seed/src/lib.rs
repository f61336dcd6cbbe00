//! Built-in proverb collection and the loader that puts it in a store.

use serde::Serialize;
use vorbabuna_core::config::ImageryConfig;
use vorbabuna_core::imagery;
use vorbabuna_core::models::NewProverb;
use vorbabuna_core::store::ProverbStore;
use vorbabuna_core::text;
use vorbabuna_core::VorbaError;

pub struct SeedProverb {
    pub text: &'static str,
    pub meaning: &'static str,
    pub category: &'static str,
    pub region: &'static str,
}

pub const SEED_PROVERBS: &[SeedProverb] = &[
    SeedProverb {
        text: "Apa trece, pietrele rămân",
        meaning: "Lucrurile importante și durabile rămân, în timp ce cele trecătoare dispar",
        category: "filozofie",
        region: "național",
    },
    SeedProverb {
        text: "Așchia nu sare departe de trunchi",
        meaning: "Copiii seamănă cu părinții lor, moștenind calitățile și defectele acestora",
        category: "familie",
        region: "Ardeal",
    },
    SeedProverb {
        text: "Cine se scoală de dimineață, departe ajunge",
        meaning: "Persoanele active și harnice reușesc mai ușor în viață",
        category: "muncă",
        region: "național",
    },
    SeedProverb {
        text: "Nu-i frunză fără rouă",
        meaning: "Totul are o cauză și o explicație; nimic nu se întâmplă fără motiv",
        category: "filozofie",
        region: "Moldova",
    },
    SeedProverb {
        text: "Graba strică treaba",
        meaning: "Când faci lucrurile în grabă, riști să greșești și să înrăutățești situația",
        category: "muncă",
        region: "național",
    },
    SeedProverb {
        text: "Privește-ți gura, că te privește lumea",
        meaning: "Fii atent la ceea ce spui, pentru că vorbele tale te definesc în fața altora",
        category: "înțelepciune",
        region: "național",
    },
    SeedProverb {
        text: "Cine se aseamănă se adună",
        meaning: "Oamenii cu calități sau interese asemănătoare tind să devină prieteni",
        category: "prietenie",
        region: "național",
    },
    SeedProverb {
        text: "Unde-i fum, e și foc",
        meaning: "Zvonurile au de obicei un fond de adevăr",
        category: "înțelepciune",
        region: "național",
    },
    SeedProverb {
        text: "Vorba dulce mult aduce",
        meaning: "Prin politețe și amabilitate obții mai mult decât prin forță",
        category: "prietenie",
        region: "Transilvania",
    },
    SeedProverb {
        text: "La nevoie se cunoaște prietenul",
        meaning: "Adevărații prieteni rămân alături de tine în momentele grele",
        category: "prietenie",
        region: "Muntenia",
    },
    SeedProverb {
        text: "Omul sfințește locul",
        meaning: "Valoarea unui loc o dă omul care trăiește și muncește acolo",
        category: "filozofie",
        region: "național",
    },
    SeedProverb {
        text: "Ochii care nu se văd se uită",
        meaning: "Distanța slăbește legăturile dintre oameni",
        category: "dragoste",
        region: "Oltenia",
    },
    SeedProverb {
        text: "Cine seamănă vânt culege furtună",
        meaning: "Faptele rele se întorc asupra celui care le face",
        category: "înțelepciune",
        region: "Banat",
    },
    SeedProverb {
        text: "Nu-i bai dacă cazi, bai-i dacă nu te mai ridici",
        meaning: "Eșecul nu e definitiv decât dacă renunți",
        category: "viață",
        region: "Maramureș",
    },
    SeedProverb {
        text: "Fiecare pasăre pe limba ei piere",
        meaning: "Fiecare om suferă din cauza propriilor slăbiciuni sau vorbe",
        category: "natură",
        region: "Dobrogea",
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
    pub removed: u64,
}

/// Insert every built-in proverb as validated, with keywords and an
/// illustration. Texts already present (case-insensitive) are skipped;
/// `reset` deletes every proverb first.
pub async fn seed(
    store: &dyn ProverbStore,
    imagery_config: &ImageryConfig,
    reset: bool,
) -> Result<SeedReport, VorbaError> {
    let mut report = SeedReport::default();

    if reset {
        report.removed = store.purge().await?;
        tracing::info!("Cleared {} existing proverbs", report.removed);
    }

    for entry in SEED_PROVERBS {
        if store.find_by_text(entry.text).await?.is_some() {
            report.skipped += 1;
            continue;
        }

        let (prompt, url) = imagery::illustrate(
            imagery_config,
            entry.text,
            Some(entry.category),
            Some(entry.region),
        );
        store
            .insert(NewProverb {
                text: entry.text.to_string(),
                meaning: entry.meaning.to_string(),
                category: Some(entry.category.to_string()),
                region: Some(entry.region.to_string()),
                keywords: text::extract_keywords(entry.text),
                image_prompt: Some(prompt),
                image_url: Some(url),
                validated: true,
            })
            .await?;
        tracing::debug!("Added: {}", entry.text);
        report.inserted += 1;
    }

    tracing::info!(
        "Seed finished: {} inserted, {} skipped",
        report.inserted,
        report.skipped
    );
    Ok(report)
}
