use std::collections::{BTreeSet, HashMap};

use super::context::BuildContext;
use crate::{
    adhoc::NodeRef,
    error::RenderError,
    layout::ComponentId,
    text::Annotation,
};

/// Local markup names the default policy set knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkupName {
    Anchor,
    Choice,
    Corr,
    SourceDoc,
    Ex,
    Expan,
    Gap,
    GrBrace,
    GrLine,
    Hand,
    Hi,
    Space,
    Ins,
    Over,
    Overw,
    Under,
    Line,
    Rdg,
    Reg,
    Retrace,
    Seg,
    Mod,
    Supplied,
    Surface,
    TreeRoot,
    Unclear,
    Metamark,
    Zone,
    Other(String),
}

impl MarkupName {
    pub const KNOWN: [MarkupName; 28] = [
        MarkupName::Anchor,
        MarkupName::Choice,
        MarkupName::Corr,
        MarkupName::SourceDoc,
        MarkupName::Ex,
        MarkupName::Expan,
        MarkupName::Gap,
        MarkupName::GrBrace,
        MarkupName::GrLine,
        MarkupName::Hand,
        MarkupName::Hi,
        MarkupName::Space,
        MarkupName::Ins,
        MarkupName::Over,
        MarkupName::Overw,
        MarkupName::Under,
        MarkupName::Line,
        MarkupName::Rdg,
        MarkupName::Reg,
        MarkupName::Retrace,
        MarkupName::Seg,
        MarkupName::Mod,
        MarkupName::Supplied,
        MarkupName::Surface,
        MarkupName::TreeRoot,
        MarkupName::Unclear,
        MarkupName::Metamark,
        MarkupName::Zone,
    ];

    pub fn from_local(local: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|n| n.as_str() == local)
            .cloned()
            .unwrap_or_else(|| MarkupName::Other(local.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarkupName::Anchor => "anchor",
            MarkupName::Choice => "choice",
            MarkupName::Corr => "corr",
            MarkupName::SourceDoc => "sourceDoc",
            MarkupName::Ex => "ex",
            MarkupName::Expan => "expan",
            MarkupName::Gap => "gap",
            MarkupName::GrBrace => "grBrace",
            MarkupName::GrLine => "grLine",
            MarkupName::Hand => "hand",
            MarkupName::Hi => "hi",
            MarkupName::Space => "space",
            MarkupName::Ins => "ins",
            MarkupName::Over => "over",
            MarkupName::Overw => "overw",
            MarkupName::Under => "under",
            MarkupName::Line => "line",
            MarkupName::Rdg => "rdg",
            MarkupName::Reg => "reg",
            MarkupName::Retrace => "retrace",
            MarkupName::Seg => "seg",
            MarkupName::Mod => "mod",
            MarkupName::Supplied => "supplied",
            MarkupName::Surface => "surface",
            MarkupName::TreeRoot => "treeRoot",
            MarkupName::Unclear => "unclear",
            MarkupName::Metamark => "metamark",
            MarkupName::Zone => "zone",
            MarkupName::Other(name) => name,
        }
    }
}

/// How one kind of markup turns into view components. Every hook is optional.
pub trait ElementPolicy {
    /// Whether the element takes part in the ad-hoc tree. Policies that
    /// override [`build`](Self::build) should return true.
    fn is_structural(&self) -> bool {
        false
    }

    /// Builds the component for `node`, or none to skip it structurally.
    fn build(
        &self,
        _node: NodeRef<'_>,
        _cx: &mut BuildContext<'_>,
    ) -> Result<Option<ComponentId>, RenderError> {
        Ok(None)
    }

    /// Runs after the component is attached, before its children.
    fn on_attach(
        &self,
        _vc: ComponentId,
        _node: NodeRef<'_>,
        _cx: &mut BuildContext<'_>,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    /// Runs after the children are built.
    fn on_detach(
        &self,
        _vc: ComponentId,
        _node: NodeRef<'_>,
        _cx: &mut BuildContext<'_>,
    ) -> Result<(), RenderError> {
        Ok(())
    }

    /// Runs for every annotation overlapping a newly created text run.
    fn on_text(
        &self,
        _annotation: &Annotation,
        _text_vc: ComponentId,
        _cx: &mut BuildContext<'_>,
    ) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Fallback for names without a registered policy.
struct Ignore;

impl ElementPolicy for Ignore {}

/// Maps markup names to their policies.
pub struct PolicyRegistry {
    policies: HashMap<MarkupName, Box<dyn ElementPolicy>>,
}

impl PolicyRegistry {
    /// An empty registry; every name resolves to a no-op.
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: MarkupName, policy: impl ElementPolicy + 'static) -> &mut Self {
        self.policies.insert(name, Box::new(policy));
        self
    }

    pub fn policy(&self, local: &str) -> &dyn ElementPolicy {
        match self.policies.get(&MarkupName::from_local(local)) {
            Some(policy) => policy.as_ref(),
            None => &Ignore,
        }
    }

    /// Names whose policies build components; the ad-hoc tree allowlist.
    pub fn structural_names(&self) -> BTreeSet<String> {
        self.policies
            .iter()
            .filter(|(_, p)| p.is_structural())
            .map(|(name, _)| name.as_str().to_string())
            .collect()
    }
}

impl Default for PolicyRegistry {
    /// The manuscript edition's element handling.
    fn default() -> Self {
        use super::kinds::{decoration, inline, structure};

        let mut registry = Self::new();
        registry
            .register(MarkupName::Anchor, structure::Anchor)
            .register(MarkupName::Choice, inline::Plain)
            .register(MarkupName::Corr, inline::Plain)
            .register(MarkupName::SourceDoc, structure::Surface)
            .register(MarkupName::Ex, inline::Plain)
            .register(MarkupName::Expan, inline::Plain)
            .register(MarkupName::Gap, inline::Gap)
            .register(MarkupName::GrBrace, structure::GrBrace)
            .register(MarkupName::GrLine, inline::GrLine)
            .register(MarkupName::Hand, decoration::Hand)
            .register(MarkupName::Hi, decoration::Hi)
            .register(MarkupName::Space, inline::Space)
            .register(MarkupName::Ins, inline::Ins)
            .register(MarkupName::Over, decoration::ClassMarker("over"))
            .register(MarkupName::Overw, inline::Plain)
            .register(MarkupName::Under, decoration::ClassMarker("under"))
            .register(MarkupName::Line, structure::Line)
            .register(MarkupName::Rdg, inline::Plain)
            .register(MarkupName::Reg, inline::Plain)
            .register(MarkupName::Retrace, decoration::Retrace)
            .register(MarkupName::Seg, inline::Seg)
            .register(MarkupName::Mod, decoration::Mod)
            .register(MarkupName::Supplied, inline::Supplied)
            .register(MarkupName::Surface, structure::Surface)
            .register(MarkupName::TreeRoot, structure::Surface)
            .register(MarkupName::Unclear, inline::Unclear)
            .register(MarkupName::Metamark, decoration::Metamark)
            .register(MarkupName::Zone, structure::Zone);
        registry
    }
}
