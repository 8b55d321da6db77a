//! Static persona-keyed lookup tables used by the pattern systems.
//!
//! Every lookup takes the raw persona key and returns an empty slice for keys
//! that are not recognized.

use crate::journey::Persona;

type Table = &'static [&'static str];

fn lookup(persona: &str, table: fn(Persona) -> Table) -> Table {
    Persona::from_key(persona).map(table).unwrap_or(&[])
}

// ── Value articulation ──────────────────────────────────────────────

pub fn health_insights(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &[
            "Understanding your health status",
            "Identifying manageable steps",
            "Building confidence in your health journey",
        ],
        Persona::StructuredSystemSeeker => &[
            "Systematic health assessment",
            "Clear health metrics",
            "Structured improvement plans",
        ],
        Persona::BalancedLifeIntegrator => &[
            "Holistic health understanding",
            "Life-integrated wellness",
            "Sustainable health practices",
        ],
        Persona::HealthcareProfessional => &[
            "Clinical health insights",
            "Evidence-based approaches",
            "Professional health standards",
        ],
        Persona::OverlookedRiskGroup => &[
            "Accessible health information",
            "Clear health guidance",
            "Supportive health practices",
        ],
    })
}

pub fn actionable_steps(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &[
            "Take small, manageable steps",
            "Track your progress",
            "Celebrate your achievements",
        ],
        Persona::StructuredSystemSeeker => &[
            "Follow systematic approaches",
            "Use clear frameworks",
            "Implement structured plans",
        ],
        Persona::BalancedLifeIntegrator => &[
            "Integrate health into daily life",
            "Balance different life aspects",
            "Maintain sustainable practices",
        ],
        Persona::HealthcareProfessional => &[
            "Apply clinical knowledge",
            "Follow evidence-based practices",
            "Maintain professional standards",
        ],
        Persona::OverlookedRiskGroup => &[
            "Access clear guidance",
            "Follow supportive practices",
            "Build health confidence",
        ],
    })
}

// ── Progressive disclosure ──────────────────────────────────────────

pub fn transition_triggers(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &[
            "Low anxiety threshold",
            "Clear value proposition",
            "Gradual progression",
        ],
        Persona::StructuredSystemSeeker => &[
            "Systematic approach",
            "Clear methodology",
            "Comprehensive framework",
        ],
        Persona::BalancedLifeIntegrator => {
            &["Life context", "Practical application", "Holistic view"]
        }
        Persona::HealthcareProfessional => &[
            "Clinical relevance",
            "Evidence-based approach",
            "Professional context",
        ],
        Persona::OverlookedRiskGroup => {
            &["Accessible format", "Supportive context", "Clear guidance"]
        }
    })
}

// ── Emotional scaffolding ───────────────────────────────────────────

pub fn support_triggers(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &[
            "Focus on small, manageable steps",
            "Emphasize progress over perfection",
            "Highlight positive outcomes",
        ],
        Persona::StructuredSystemSeeker => &[
            "Provide clear frameworks",
            "Show systematic approaches",
            "Demonstrate logical progression",
        ],
        Persona::BalancedLifeIntegrator => &[
            "Connect to life context",
            "Show practical applications",
            "Emphasize holistic benefits",
        ],
        Persona::HealthcareProfessional => &[
            "Reference clinical evidence",
            "Focus on professional impact",
            "Highlight practical applications",
        ],
        Persona::OverlookedRiskGroup => &[
            "Use accessible language",
            "Provide clear guidance",
            "Offer supportive context",
        ],
    })
}

// ── Persona adaptation ──────────────────────────────────────────────

pub fn traits(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &["cautious", "detail-oriented", "methodical"],
        Persona::StructuredSystemSeeker => &["analytical", "organized", "systematic"],
        Persona::BalancedLifeIntegrator => &["practical", "holistic", "balanced"],
        Persona::HealthcareProfessional => &["professional", "knowledgeable", "efficient"],
        Persona::OverlookedRiskGroup => &["pragmatic", "resourceful", "adaptive"],
    })
}

pub fn preferences(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &["visual", "structured", "detailed"],
        Persona::StructuredSystemSeeker => &["systematic", "organized", "comprehensive"],
        Persona::BalancedLifeIntegrator => &["practical", "integrated", "contextual"],
        Persona::HealthcareProfessional => &["efficient", "evidence-based", "practical"],
        Persona::OverlookedRiskGroup => &["accessible", "practical", "supportive"],
    })
}

pub fn needs(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &["guidance", "reassurance", "structure"],
        Persona::StructuredSystemSeeker => &["organization", "clarity", "comprehensiveness"],
        Persona::BalancedLifeIntegrator => &["integration", "practicality", "context"],
        Persona::HealthcareProfessional => &["efficiency", "evidence", "practicality"],
        Persona::OverlookedRiskGroup => &["accessibility", "support", "guidance"],
    })
}

pub fn goals(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &["safety", "understanding", "control"],
        Persona::StructuredSystemSeeker => &["comprehension", "organization", "efficiency"],
        Persona::BalancedLifeIntegrator => &["integration", "balance", "practicality"],
        Persona::HealthcareProfessional => &["efficiency", "effectiveness", "impact"],
        Persona::OverlookedRiskGroup => &["accessibility", "understanding", "support"],
    })
}

pub fn adaptation_focus(persona: &str) -> Table {
    lookup(persona, |p| match p {
        Persona::HealthAwareAvoider => &["safety", "guidance", "structure"],
        Persona::StructuredSystemSeeker => &["organization", "clarity", "comprehensiveness"],
        Persona::BalancedLifeIntegrator => &["integration", "practicality", "context"],
        Persona::HealthcareProfessional => &["efficiency", "evidence", "practicality"],
        Persona::OverlookedRiskGroup => &["accessibility", "support", "guidance"],
    })
}

/// Convert a static table into owned strings.
pub fn owned(table: Table) -> Vec<String> {
    table.iter().map(|s| s.to_string()).collect()
}
