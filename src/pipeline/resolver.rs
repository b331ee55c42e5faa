//! Dynamic pad linking.
//!
//! Demuxing sources only expose their output pads once they have inspected
//! the container. [`LinkResolver`] decides, for each newly discovered pad,
//! which downstream chain it feeds. Claimed chains are tracked explicitly so
//! repeated discovery callbacks are harmless.

use super::graph::Pipeline;
use crate::config::ChainConfig;
use crate::element::PadRef;
use crate::observability;

/// What the resolver did with a discovered pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing to do: the pad or every relevant chain is already linked.
    AlreadyLinked,
    /// The pad's media type is not in the accepted set.
    Ignored {
        /// Media type of the pad (empty if unknown).
        media_type: String,
    },
    /// No chain is configured for this media type.
    NoChain {
        /// Media type of the pad.
        media_type: String,
    },
    /// The pad now feeds this chain.
    Linked {
        /// Chain name.
        chain: String,
    },
    /// Every compatible chain refused the link.
    Failed {
        /// Number of link attempts made.
        attempts: usize,
    },
}

/// Diagnostic record of one link attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttempt {
    /// Discovered pad.
    pub pad: PadRef,
    /// Chain it was offered to.
    pub chain: String,
    /// `Err` carries the reason the link was refused.
    pub outcome: Result<(), String>,
}

#[derive(Debug, Clone)]
struct ChainSlot {
    config: ChainConfig,
    claimed: bool,
}

impl ChainSlot {
    fn sink(&self) -> PadRef {
        PadRef::new(self.config.element.as_str(), self.config.pad.as_str())
    }
}

/// Routes discovered pads to downstream chains by media type.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    accepted: Vec<String>,
    chains: Vec<ChainSlot>,
    attempts: Vec<LinkAttempt>,
}

impl LinkResolver {
    /// Create a resolver for the given accepted prefixes and chains.
    pub fn new(accepted: Vec<String>, chains: Vec<ChainConfig>) -> Self {
        Self {
            accepted,
            chains: chains
                .into_iter()
                .map(|config| ChainSlot {
                    config,
                    claimed: false,
                })
                .collect(),
            attempts: Vec::new(),
        }
    }

    /// Release every claim and forget past attempts, e.g. for new media.
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            chain.claimed = false;
        }
        self.attempts.clear();
    }

    /// Whether a chain's sink pad is claimed.
    pub fn is_claimed(&self, chain: &str) -> bool {
        self.chains
            .iter()
            .any(|c| c.config.name == chain && c.claimed)
    }

    /// All link attempts since the last reset.
    pub fn attempts(&self) -> &[LinkAttempt] {
        &self.attempts
    }

    /// Decide linkage for a newly discovered pad.
    pub fn resolve(&mut self, pipeline: &mut Pipeline, pad: &PadRef) -> Resolution {
        // Chains linked behind our back count as claimed.
        for chain in &mut self.chains {
            if !chain.claimed && pipeline.is_linked(&chain.sink()) {
                chain.claimed = true;
            }
        }

        if pipeline.is_linked(pad)
            || (!self.chains.is_empty() && self.chains.iter().all(|c| c.claimed))
        {
            tracing::info!(pad = %pad, "downstream already linked, ignoring");
            return Resolution::AlreadyLinked;
        }

        let media_type = pipeline
            .pad(pad)
            .and_then(|p| p.caps())
            .map(|c| c.media_type().to_string())
            .unwrap_or_default();

        let accepted = self
            .accepted
            .iter()
            .any(|prefix| media_type.starts_with(prefix.as_str()));
        if media_type.is_empty() || !accepted {
            tracing::info!(pad = %pad, media_type = %media_type, "type not accepted, ignoring");
            return Resolution::Ignored { media_type };
        }

        let compatible: Vec<usize> = self
            .chains
            .iter()
            .enumerate()
            .filter(|(_, c)| media_type.starts_with(c.config.caps_prefix.as_str()))
            .map(|(i, _)| i)
            .collect();

        if compatible.is_empty() {
            tracing::info!(pad = %pad, media_type = %media_type, "no chain for type");
            return Resolution::NoChain { media_type };
        }
        if compatible.iter().all(|&i| self.chains[i].claimed) {
            tracing::info!(pad = %pad, media_type = %media_type, "chain already linked, ignoring");
            return Resolution::AlreadyLinked;
        }

        let mut attempts = 0;
        for i in compatible {
            if self.chains[i].claimed {
                continue;
            }
            attempts += 1;
            let sink = self.chains[i].sink();
            let chain = self.chains[i].config.name.clone();
            let outcome = pipeline.link_pads(pad, &sink).map_err(|e| e.to_string());
            observability::trace_link_attempt(
                pad,
                &chain,
                &media_type,
                outcome.as_ref().err().map(String::as_str),
            );

            let linked = outcome.is_ok();
            self.attempts.push(LinkAttempt {
                pad: pad.clone(),
                chain: chain.clone(),
                outcome,
            });
            if linked {
                self.chains[i].claimed = true;
                return Resolution::Linked { chain };
            }
        }
        Resolution::Failed { attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Pad};

    struct Sink(&'static str);
    impl Element for Sink {
        fn pads(&self) -> Vec<Pad> {
            vec![Pad::sink().accepting([self.0])]
        }
    }

    struct Demux;
    impl Element for Demux {}

    fn setup() -> (Pipeline, LinkResolver) {
        let mut p = Pipeline::new("test");
        p.add("source", "demux", Box::new(Demux)).unwrap();
        p.add("convert", "audioconvert", Box::new(Sink("audio/x-raw"))).unwrap();
        p.add("vcon", "videoconvert", Box::new(Sink("video/x-raw"))).unwrap();
        let resolver = LinkResolver::new(
            vec!["audio/x-raw".into(), "video/x-raw".into()],
            vec![
                ChainConfig::new("audio", "audio/x-raw", "convert", "sink"),
                ChainConfig::new("video", "video/x-raw", "vcon", "sink"),
            ],
        );
        (p, resolver)
    }

    #[test]
    fn test_routes_by_type() {
        let (mut p, mut r) = setup();
        let video = p.add_pad("source", Pad::sometimes("src_0", "video/x-raw, width=854")).unwrap();
        let audio = p.add_pad("source", Pad::sometimes("src_1", "audio/x-raw")).unwrap();

        assert_eq!(r.resolve(&mut p, &video), Resolution::Linked { chain: "video".into() });
        assert_eq!(r.resolve(&mut p, &audio), Resolution::Linked { chain: "audio".into() });
        assert!(r.is_claimed("audio") && r.is_claimed("video"));
        assert_eq!(r.attempts().len(), 2);
    }

    #[test]
    fn test_unaccepted_type_ignored() {
        let (mut p, mut r) = setup();
        let text = p.add_pad("source", Pad::sometimes("src_2", "text/x-raw")).unwrap();
        assert_eq!(
            r.resolve(&mut p, &text),
            Resolution::Ignored { media_type: "text/x-raw".into() }
        );
        assert!(!p.is_linked(&text));
        assert!(r.attempts().is_empty());
    }

    #[test]
    fn test_second_pad_of_claimed_type() {
        let (mut p, mut r) = setup();
        let a0 = p.add_pad("source", Pad::sometimes("src_0", "audio/x-raw")).unwrap();
        let a1 = p.add_pad("source", Pad::sometimes("src_1", "audio/x-raw")).unwrap();

        assert!(matches!(r.resolve(&mut p, &a0), Resolution::Linked { .. }));
        assert_eq!(r.resolve(&mut p, &a1), Resolution::AlreadyLinked);
        assert!(!p.is_linked(&a1));
        assert_eq!(r.attempts().len(), 1);
    }

    #[test]
    fn test_failed_attempt_recorded() {
        let (mut p, mut r) = setup();
        // Compatible by prefix but refused by the sink pad.
        let odd = p.add_pad("source", Pad::sometimes("src_0", "audio/x-raw-float")).unwrap();
        p.add("strict", "fakesink", Box::new(Sink("audio/x-raw-int"))).unwrap();
        let mut r2 = LinkResolver::new(
            vec!["audio/x-raw".into()],
            vec![ChainConfig::new("strict", "audio/x-raw", "strict", "sink")],
        );
        assert_eq!(r2.resolve(&mut p, &odd), Resolution::Failed { attempts: 1 });
        assert!(r2.attempts()[0].outcome.is_err());
        assert!(!r2.is_claimed("strict"));

        // The default resolver is unaffected.
        assert!(matches!(r.resolve(&mut p, &odd), Resolution::Linked { .. }));
    }

    #[test]
    fn test_reset_releases_claims() {
        let (mut p, mut r) = setup();
        let a = p.add_pad("source", Pad::sometimes("src_0", "audio/x-raw")).unwrap();
        r.resolve(&mut p, &a);
        p.remove_dynamic_pads("source").unwrap();
        r.reset();
        assert!(!r.is_claimed("audio"));
        assert!(r.attempts().is_empty());
    }
}
