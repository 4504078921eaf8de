//! The `M` / `MM` math region macro.
//!
//! Regions may nest arbitrarily, but only the outermost one calls the backend, over the
//! concatenated raw markup of everything inside it. Inner regions pass their text through
//! untouched: a pre-rendered fragment inside the outer markup would no longer be valid
//! input for the backend.

use super::context::Context;
use super::{expand_nodes, map_expanded};
use crate::ast::{MathRegion, Node};
use crate::error::{Halt, Result};
use crate::render::math::RenderOptions;

/// Inline math region.
pub fn m(
    ctx: &mut Context<'_>,
    children: &[Node],
    prefix: Option<&[Node]>,
    postfix: Option<&[Node]>,
) -> Result<String> {
    expand_region(ctx, false, children, prefix, postfix)
}

/// Display math region.
pub fn mm(
    ctx: &mut Context<'_>,
    children: &[Node],
    prefix: Option<&[Node]>,
    postfix: Option<&[Node]>,
) -> Result<String> {
    expand_region(ctx, true, children, prefix, postfix)
}

/// Evaluate one math region, rendering it if it is the outermost one.
pub fn expand_math(ctx: &mut Context<'_>, region: &MathRegion) -> Result<String> {
    expand_region(
        ctx,
        region.display,
        &region.children,
        region.prefix.as_deref(),
        region.postfix.as_deref(),
    )
}

fn expand_region(
    ctx: &mut Context<'_>,
    display: bool,
    children: &[Node],
    prefix: Option<&[Node]>,
    postfix: Option<&[Node]>,
) -> Result<String> {
    let entered = ctx.math_state().enter(display);
    let mut scope = ctx.with_math_state(entered);

    let mut evaled = String::new();
    if let Some(prefix) = prefix {
        evaled.push_str(&map_expanded(&mut scope, prefix, text_span)?);
    }
    evaled.push_str(&expand_nodes(&mut scope, children)?);
    if let Some(postfix) = postfix {
        evaled.push_str(&map_expanded(&mut scope, postfix, text_span)?);
    }

    render_if_owner(&mut scope, display, evaled)
}

/// Mark `text` as upright text so it renders inside the formula without math styling.
fn text_span(_: &mut Context<'_>, text: String) -> Result<String> {
    Ok(format!("\\text{{{}}}", escape_text(&text)))
}

/// Escape characters that are special in text mode. Existing `\x` sequences are kept.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                escaped.push(c);
                if let Some(next) = chars.next() {
                    escaped.push(next);
                }
            }
            '%' | '#' | '&' | '$' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' => escaped.push_str("\\textasciicircum{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn render_if_owner(ctx: &mut Context<'_>, display: bool, evaled: String) -> Result<String> {
    if !ctx.math_state().owns_render() {
        return Ok(evaled);
    }

    let options = RenderOptions::new(ctx.options(), display);
    log::debug!(
        "rendering {} math: {}",
        if display { "display" } else { "inline" },
        evaled
    );

    match ctx.render_math(&evaled, &options) {
        Ok(rendered) => Ok(rendered),
        Err(e) => {
            log::error!("failed to render math: {}", e);
            log::error!("detail: {:?}", e);
            log::error!("input: {}", evaled);
            Err(Halt {
                reason: e.to_string(),
                input: evaled,
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::config::{MathRenderOptions, OutputFormat, PartialMathOptions};
    use crate::expand::state::MathModeState;
    use crate::expand::testing::Recorder;
    use crate::expand::{expand_nodes, Context};
    use pretty_assertions::assert_eq;

    fn run(recorder: &Recorder, nodes: &[Node]) -> Result<String> {
        let mut ctx = Context::new(recorder, MathRenderOptions::default());
        expand_nodes(&mut ctx, nodes)
    }

    #[test]
    fn test_top_level_inline() {
        let recorder = Recorder::new();
        let out = run(&recorder, &[Node::m(vec!["x^2".into()])]).unwrap();

        assert_eq!(out, "<render>x^2</render>");
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "x^2");

        let options = &calls[0].1;
        assert!(!options.display_mode);
        assert!(options.throw_on_error);
        assert_eq!(options.settings.output, OutputFormat::Html);
        assert_eq!(options.settings, MathRenderOptions::default());
    }

    #[test]
    fn test_nested_renders_once_with_outer_display() {
        let recorder = Recorder::new();
        let tree = Node::mm(vec![Node::m(vec!["y".into()]), "+1".into()]);
        let out = run(&recorder, &[tree]).unwrap();

        assert_eq!(out, "<render>y+1</render>");
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "y+1");
        assert!(calls[0].1.display_mode);
    }

    #[test]
    fn test_inner_display_argument_is_ignored() {
        let recorder = Recorder::new();
        let tree = Node::m(vec![
            "a".into(),
            Node::mm(vec!["b".into(), Node::mm(vec!["c".into()])]),
        ]);
        run(&recorder, &[tree]).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "abc");
        assert!(!calls[0].1.display_mode);
    }

    #[test]
    fn test_deep_nesting_renders_once() {
        for depth in 1..8 {
            let mut tree = Node::text("x");
            for level in 0..depth {
                tree = Node::Math(
                    MathRegion::new(level % 2 == 0, vec![tree])
                        .with_prefix(vec![Node::text(format!("p{}", level))]),
                );
            }

            let recorder = Recorder::new();
            run(&recorder, &[tree]).unwrap();
            assert_eq!(recorder.calls().len(), 1, "depth {}", depth);
            assert!(!recorder.calls()[0].0.contains("<render>"));
        }
    }

    #[test]
    fn test_siblings_render_separately() {
        let recorder = Recorder::new();
        let out = run(
            &recorder,
            &[
                Node::mm(vec!["a".into()]),
                " and ".into(),
                Node::m(vec!["b".into()]),
            ],
        )
        .unwrap();

        assert_eq!(out, "<render>a</render> and <render>b</render>");
        let calls = recorder.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.display_mode);
        assert!(!calls[1].1.display_mode);
    }

    #[test]
    fn test_state_restored_after_region() {
        let recorder = Recorder::new();
        let mut ctx = Context::new(&recorder, MathRenderOptions::default());
        m(&mut ctx, &["a".into()], None, None).unwrap();
        assert_eq!(ctx.math_state(), MathModeState::default());
        mm(&mut ctx, &["b".into()], None, None).unwrap();
        assert_eq!(ctx.math_state(), MathModeState::default());
        assert_eq!(ctx.renders(), 2);
    }

    #[test]
    fn test_math_mode_visible_inside_children() {
        let branch = || Node::IfMath {
            math: vec!["in".into()],
            text: vec!["out".into()],
        };
        let recorder = Recorder::new();
        let out = run(
            &recorder,
            &[
                branch(),
                Node::m(vec![branch(), Node::m(vec![branch()])]),
                branch(),
            ],
        )
        .unwrap();

        assert_eq!(out, "out<render>inin</render>out");
    }

    #[test]
    fn test_display_mode_branch() {
        let branch = || Node::IfDisplay {
            display: vec!["D".into()],
            inline: vec!["I".into()],
        };
        let recorder = Recorder::new();
        run(
            &recorder,
            &[
                branch(),
                Node::mm(vec![branch(), Node::m(vec![branch()])]),
                Node::m(vec![branch(), Node::mm(vec![branch()])]),
            ],
        )
        .unwrap();

        let calls = recorder.calls();
        assert_eq!(calls[0].0, "DD");
        assert_eq!(calls[1].0, "II");
    }

    #[test]
    fn test_prefix_and_postfix_are_inside_markup() {
        let recorder = Recorder::new();
        let region = MathRegion::new(false, vec!["z".into()])
            .with_prefix(vec!["see: ".into()])
            .with_postfix(vec![".".into()]);
        let out = run(&recorder, &[region.into()]).unwrap();

        assert_eq!(recorder.calls()[0].0, "\\text{see: }z\\text{.}");
        assert_eq!(out, "<render>\\text{see: }z\\text{.}</render>");
    }

    #[test]
    fn test_region_helpers_take_prefix_and_postfix() {
        let recorder = Recorder::new();
        let mut ctx = Context::new(&recorder, MathRenderOptions::default());
        let out = mm(&mut ctx, &["z".into()], Some(&[Node::text("so ")][..]), None).unwrap();

        assert_eq!(out, "<render>\\text{so }z</render>");
        assert!(recorder.calls()[0].1.display_mode);

        m(&mut ctx, &["w".into()], None, Some(&[Node::text(",")][..])).unwrap();
        assert_eq!(recorder.calls()[1].0, "w\\text{,}");
    }

    #[test]
    fn test_prefix_text_is_escaped() {
        let recorder = Recorder::new();
        let region = MathRegion::new(false, vec!["x".into()])
            .with_prefix(vec!["50% of a_1 & \\% ".into()])
            .with_postfix(vec!["~#".into()]);
        run(&recorder, &[region.into()]).unwrap();

        assert_eq!(
            recorder.calls()[0].0,
            "\\text{50\\% of a\\_1 \\& \\% }x\\text{\\textasciitilde{}\\#}"
        );
    }

    #[test]
    fn test_nested_prefix_reaches_outer_render() {
        let recorder = Recorder::new();
        let inner = MathRegion::new(true, vec!["y".into()]).with_prefix(vec!["if ".into()]);
        run(&recorder, &[Node::m(vec!["x, ".into(), inner.into()])]).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "x, \\text{if }y");
    }

    #[test]
    fn test_empty_children_still_render() {
        let recorder = Recorder::new();
        run(&recorder, &[Node::m(vec![])]).unwrap();
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "");
    }

    #[test]
    fn test_scoped_config_reaches_backend() {
        let recorder = Recorder::new();
        let tree = Node::MathConfig {
            options: PartialMathOptions {
                error_color: Some("#fff".to_string()),
                halt_on_error: Some(false),
                ..Default::default()
            },
            children: vec![Node::mm(vec!["a".into()])],
        };
        run(&recorder, &[tree, Node::m(vec!["b".into()])]).unwrap();

        let calls = recorder.calls();
        assert_eq!(calls[0].1.settings.error_color, "#fff");
        assert!(!calls[0].1.throw_on_error);
        assert_eq!(calls[1].1.settings.error_color, "#cc0000");
        assert!(calls[1].1.throw_on_error);
    }

    #[test]
    fn test_backend_failure_halts() {
        let recorder = Recorder::failing_on("bad");
        let mut ctx = Context::new(&recorder, MathRenderOptions::default());
        let nodes = vec![
            Node::m(vec!["ok".into()]),
            Node::mm(vec![Node::m(vec!["bad".into()])]),
            Node::m(vec!["never".into()]),
        ];

        let err = expand_nodes(&mut ctx, &nodes).unwrap_err();
        assert!(err.is_halt());
        match err {
            crate::error::Error::Halt(halt) => assert_eq!(halt.input, "bad"),
            other => panic!("expected halt, got {:?}", other),
        }

        // The walk stopped at the failing region and the state unwound.
        assert_eq!(recorder.calls().len(), 2);
        assert_eq!(ctx.math_state(), MathModeState::default());
    }
}
