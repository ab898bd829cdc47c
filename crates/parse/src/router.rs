use smsledger_core::{InboundMessage, ParsedTransaction};

use crate::parsers::{
    AxisParser, BankParser, GenericParser, HdfcParser, HsbcParser, IciciParser, KotakParser,
    PnbParser, SbiParser, UpiParser,
};

/// Picks the parser for a sender id.
///
/// Bank parsers are tried in registration order; the UPI-app parser is
/// registered last among them since bank messages mention "UPI" too. Senders
/// nobody claims go to the [`GenericParser`].
pub struct ParserRouter {
    parsers: Vec<Box<dyn BankParser>>,
    generic: GenericParser,
}

impl Default for ParserRouter {
    fn default() -> Self {
        Self::with_generic(GenericParser::new())
    }
}

impl ParserRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in parsers with a custom generic fallback.
    pub fn with_generic(generic: GenericParser) -> Self {
        let parsers: Vec<Box<dyn BankParser>> = vec![
            Box::new(HdfcParser),
            Box::new(IciciParser),
            Box::new(HsbcParser),
            Box::new(SbiParser),
            Box::new(AxisParser),
            Box::new(KotakParser),
            Box::new(PnbParser),
            Box::new(UpiParser),
        ];
        Self { parsers, generic }
    }

    pub fn route(&self, sender: &str) -> &dyn BankParser {
        self.parsers
            .iter()
            .find(|p| p.can_parse(sender))
            .map(|p| &**p)
            .unwrap_or(&self.generic as &dyn BankParser)
    }

    pub fn parse(&self, message: &InboundMessage) -> Option<ParsedTransaction> {
        let parser = self.route(&message.sender);
        tracing::trace!(sender = %message.sender, parser = parser.bank_name(), "routed");
        parser.parse(&message.body, message.received_at)
    }
}
