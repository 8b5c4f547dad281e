//! Warning catalog shown on the lockdown interstitial.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningMessage {
    pub heading: &'static str,
    pub headline: &'static str,
    pub body: &'static str,
    pub exit_strategy: &'static str,
}

pub const CATALOG: [WarningMessage; 10] = [
    WarningMessage {
        heading: "NEUROCHEMICAL DECEPTION",
        headline: "You are chasing a ghost.",
        body: "Your brain is currently stuck in a \"Reward Prediction Error\" loop. It releases dopamine in anticipation of the next post, not the enjoyment of it. You aren't scrolling because you are having fun; you are scrolling because your brain believes the next swipe holds the answer. It is a lie.",
        exit_strategy: "Close your eyes. Realize the craving is for the possibility of reward, not the reward itself. Break the loop.",
    },
    WarningMessage {
        heading: "SENSORY ADAPTATION",
        headline: "You are numbing your ability to feel joy.",
        body: "By flooding your receptors with high-speed, high-contrast stimuli, you are raising your \"pleasure baseline.\" This process, called downregulation, makes the rest of reality (sunsets, conversation, slow work) feel painfully boring by comparison. You are engineering your own depression.",
        exit_strategy: "Stare at a blank wall for 30 seconds. Reset your baseline sensitivity. Embrace the boredom to heal.",
    },
    WarningMessage {
        heading: "INFORMATION OBESITY",
        headline: "You are choking on data.",
        body: "The human brain is an organ, not a hard drive. It requires silence to metabolize information into wisdom. Right now, you are force-feeding your mind more inputs than it can process, resulting in \"Continuous Partial Attention.\" The fog you feel is mental indigestion.",
        exit_strategy: "Stop the intake. Close this tab. Do not consume another pixel until you have processed the last 10 minutes.",
    },
    WarningMessage {
        heading: "CREATIVE ATROPHY",
        headline: "You are paving over your own thoughts.",
        body: "Boredom is the trigger for the \"Default Mode Network\", the brain state responsible for creativity, long-term planning, and self-reflection. By scrolling the second you feel a lull, you are suppressing your internal monologue with external noise. You are trading your own insights for someone else's content.",
        exit_strategy: "Be bored. Sit there and let your mind wander inward, not outward.",
    },
    WarningMessage {
        heading: "PHYSIOLOGICAL STRESS",
        headline: "Your body thinks it is in danger.",
        body: "Perform a somatic check: Is your jaw clenched? Is your breath shallow? Are your eyes straining? Rapid visual processing triggers a low-level \"Fight or Flight\" response. You are flooding your bloodstream with cortisol while sitting perfectly still. This is not relaxation; it is physical stress.",
        exit_strategy: "Exhale fully. Drop your shoulders. The threat is the device. Put it down.",
    },
    WarningMessage {
        heading: "VOLITION HIJACK",
        headline: "Who is in control right now?",
        body: "Your Prefrontal Cortex (the CEO of your brain) has gone offline. You are currently operating on basal ganglia loops: habitual, automatic, and unconscious. You are not choosing to look at this; you are reacting to cues designed by behavioral psychologists to exploit your lack of agency.",
        exit_strategy: "Prove you have free will. Close the app, not because you \"should,\" but because you say so.",
    },
    WarningMessage {
        heading: "TIME BLINDNESS",
        headline: "You are losing contact with reality.",
        body: "The flow state of infinite scroll creates a dissociation from temporal reality. You are deleting hours of your finite biological lifespan in a state of semi-consciousness. This is time you cannot refund. You are trading your youth for blue light.",
        exit_strategy: "Say the current time out loud. Acknowledge the cost. Stop the bleeding.",
    },
    WarningMessage {
        heading: "SOCIAL ISOLATION",
        headline: "You are lonelier than when you started.",
        body: "The brain interprets watching faces as social connection, but without eye contact and reciprocity, it is \"empty calories.\" You are stimulating the social centers of your brain without actually connecting, leaving you with a profound sense of isolation and inadequacy.",
        exit_strategy: "Text a real friend \"Hey, want to talk?\" or speak to a human in the room. Real connection requires risk.",
    },
    WarningMessage {
        heading: "ATTENTION DEGRADATION",
        headline: "You are training your brain to be distracted.",
        body: "Neurons that fire together, wire together. Every time you give in to the urge to switch tasks, you physically strengthen the neural pathways for distraction. You are training yourself to be incapable of deep work. You are becoming functionally illiterate to long-form thought.",
        exit_strategy: "Resist the urge. Do one thing, slowly, for 5 minutes. Re-train your focus.",
    },
    WarningMessage {
        heading: "EXISTENTIAL WAKE-UP",
        headline: "End the simulation.",
        body: "You have dissociated. You are a biological consciousness trapped in a digital feedback loop. Look at your hand. Look at the room around you. You exist in the physical world, not in this feed. Return to the surface.",
        exit_strategy: "CLOSE THE TAB. Stand up. Move your physical body immediately.",
    },
];

/// Uniform pick from [`CATALOG`].
pub fn pick_message<R: Rng + ?Sized>(rng: &mut R) -> &'static WarningMessage {
    &CATALOG[rng.gen_range(0..CATALOG.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_ten_distinct_headings() {
        let headings: HashSet<_> = CATALOG.iter().map(|m| m.heading).collect();
        assert_eq!(headings.len(), 10);
    }

    #[test]
    fn test_pick_is_deterministic_for_a_seed() {
        let first = pick_message(&mut StdRng::seed_from_u64(7));
        let second = pick_message(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_reaches_whole_catalog() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..2000).map(|_| pick_message(&mut rng).heading).collect();
        assert_eq!(seen.len(), CATALOG.len());
    }
}
