//! Locator resolution.
//!
//! Pure functions from a document snapshot and a [`Locator`] to candidate
//! nodes. Resolution order is document order within each scope root, scope
//! roots taken in their own resolution order, duplicates dropped at first
//! sight.

use crate::dom::{Dom, NodeId};
use crate::locator::{Filter, Locator, Selector};
use crate::result::NotInteractableReason;
use crate::role::{accessible_name, label_text, role_of};
use std::collections::HashSet;

/// All candidates for `locator`, in resolution order
#[must_use]
pub fn resolve(dom: &Dom, locator: &Locator) -> Vec<NodeId> {
    resolve_under(dom, locator, dom.root())
}

/// Resolve with `base` standing in for the document root
#[must_use]
pub fn resolve_under(dom: &Dom, locator: &Locator, base: NodeId) -> Vec<NodeId> {
    let roots = match locator.scope() {
        Some(scope) => resolve_under(dom, scope, base),
        None => vec![base],
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for root in roots {
        for node in dom.descendants(root) {
            if !seen.contains(&node) && matches_selector(dom, locator.selector(), node) {
                seen.insert(node);
                candidates.push(node);
            }
        }
    }

    if matches!(locator.selector(), Selector::Text(_)) {
        candidates = innermost(dom, &candidates);
    }

    candidates.retain(|node| {
        locator
            .filters()
            .iter()
            .all(|filter| passes_filter(dom, filter, *node))
    });

    match locator.pick() {
        Some(pick) => pick.apply(&candidates).into_iter().collect(),
        None => candidates,
    }
}

/// Exactly one candidate, or why not
pub fn resolve_one(dom: &Dom, locator: &Locator) -> Result<NodeId, NotInteractableReason> {
    match resolve(dom, locator).as_slice() {
        [] => Err(NotInteractableReason::NotFound),
        [only] => Ok(*only),
        many => Err(NotInteractableReason::Ambiguous { count: many.len() }),
    }
}

fn matches_selector(dom: &Dom, selector: &Selector, node: NodeId) -> bool {
    let Some(element) = dom.element(node) else {
        return false;
    };
    match selector {
        Selector::Role { role, name } => {
            role_of(dom, node) == Some(*role)
                && dom.is_visible(node)
                && name
                    .as_ref()
                    .map_or(true, |name| name.matches(&accessible_name(dom, node)))
        }
        Selector::Css(css) => css.matches(dom, node),
        Selector::Id(id) => element.attr("id") == Some(id.as_str()),
        Selector::Text(text) => text.matches(&dom.rendered_text(node)),
        Selector::Label(text) => {
            let label = element
                .attr("aria-label")
                .map(str::to_string)
                .or_else(|| label_text(dom, node));
            label.is_some_and(|label| text.matches(&label))
        }
        Selector::Placeholder(text) => element
            .attr("placeholder")
            .is_some_and(|placeholder| text.matches(placeholder)),
        Selector::TestId(id) => element.attr("data-testid") == Some(id.as_str()),
    }
}

// Drop candidates that contain another candidate.
fn innermost(dom: &Dom, candidates: &[NodeId]) -> Vec<NodeId> {
    candidates
        .iter()
        .copied()
        .filter(|outer| !candidates.iter().any(|inner| dom.contains(*outer, *inner)))
        .collect()
}

fn passes_filter(dom: &Dom, filter: &Filter, node: NodeId) -> bool {
    match filter {
        Filter::HasText(text) => text.matches(&dom.rendered_text(node)),
        Filter::Has(inner) => !resolve_under(dom, inner, node).is_empty(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::role::AriaRole;
    use proptest::prelude::*;

    const OFFERS: &str = r##"
        <nav><a href="/waerboom">Waerboom</a><a href="/other">Other venue</a></nav>
        <ul class="offers">
          <li><a href="#o1" class="offer"><span>name</span> Gastronomisch buffet op aanvraag <button id="b1">Book</button></a></li>
          <li><a href="#o2" class="offer"><span>name</span> Walking dinner <button id="b2">Book</button></a></li>
        </ul>
        <div class="mt-3"><div class="p-4" id="p1">one</div><div class="p-4" id="p2">two</div></div>
        <ul class="mt-3" id="lines">
          <li id="l1">x Gastronomisch buffet prijzen (17-...): €97.00 = €97.00 <input id="amount" type="number" value="1"></li>
          <li id="l2">x Kinderbuffet: €25.00 <input id="amount2" type="number" value="0"></li>
        </ul>
        <input type="email" placeholder="your-email@address.com" id="email">
        <div hidden><a href="/secret" id="secret">Waerboom</a></div>
    "##;

    fn dom() -> Dom {
        Dom::parse(OFFERS).unwrap()
    }

    fn ids(dom: &Dom, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| dom.attr(*n, "id").unwrap_or("?").to_string())
            .collect()
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_role_with_name_skips_hidden() {
            let dom = dom();
            let found = resolve(&dom, &Locator::role(AriaRole::Link).with_name("Waerboom"));
            assert_eq!(found.len(), 1);
            assert_eq!(dom.attr(found[0], "href"), Some("/waerboom"));
        }

        #[test]
        fn test_chained_role_in_role() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Link)
                .with_name("name Gastronomisch buffet op")
                .get_by_role(AriaRole::Button);
            assert_eq!(ids(&dom, &resolve(&dom, &locator)), vec!["b1"]);
        }

        #[test]
        fn test_css_first_is_document_order() {
            let dom = dom();
            let all = Locator::css(".mt-3 > .p-4").unwrap();
            assert_eq!(ids(&dom, &resolve(&dom, &all)), vec!["p1", "p2"]);
            assert_eq!(ids(&dom, &resolve(&dom, &all.clone().first())), vec!["p1"]);
            assert_eq!(ids(&dom, &resolve(&dom, &all.clone().last())), vec!["p2"]);
            assert!(resolve(&dom, &all.nth(5)).is_empty());
        }

        #[test]
        fn test_filter_then_scoped_id() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Listitem)
                .has_text("x Gastronomisch buffet prijzen (17-...): €97.00 = €")
                .locator("#amount")
                .unwrap();
            assert_eq!(ids(&dom, &resolve(&dom, &locator)), vec!["amount"]);
        }

        #[test]
        fn test_has_filter() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Listitem).has(Locator::id("amount2"));
            assert_eq!(ids(&dom, &resolve(&dom, &locator)), vec!["l2"]);
        }

        #[test]
        fn test_placeholder_name_for_textbox() {
            let dom = dom();
            let by_role = Locator::role(AriaRole::Textbox).with_name("your-email@address.com");
            let by_placeholder = Locator::placeholder("your-email");
            assert_eq!(ids(&dom, &resolve(&dom, &by_role)), vec!["email"]);
            assert_eq!(ids(&dom, &resolve(&dom, &by_placeholder)), vec!["email"]);
        }

        #[test]
        fn test_text_selects_innermost() {
            let dom = dom();
            let found = resolve(&dom, &Locator::text("Walking dinner"));
            assert_eq!(found.len(), 1);
            assert_eq!(dom.tag(found[0]), Some("a"));
        }

        #[test]
        fn test_scope_roots_dedupe() {
            let dom = Dom::parse(r#"<div class="a"><div class="a"><p id="x">x</p></div></div>"#).unwrap();
            let locator = Locator::css(".a").unwrap().locator("p").unwrap();
            assert_eq!(ids(&dom, &resolve(&dom, &locator)), vec!["x"]);
        }
    }

    mod resolve_one_tests {
        use super::*;

        #[test]
        fn test_not_found() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Link).with_name("Nonexistent");
            assert_eq!(resolve_one(&dom, &locator), Err(NotInteractableReason::NotFound));
        }

        #[test]
        fn test_ambiguous_carries_count() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Button).with_name("Book");
            assert_eq!(
                resolve_one(&dom, &locator),
                Err(NotInteractableReason::Ambiguous { count: 2 })
            );
        }

        #[test]
        fn test_pick_disambiguates() {
            let dom = dom();
            let locator = Locator::role(AriaRole::Button).with_name("Book").last();
            let node = resolve_one(&dom, &locator).unwrap();
            assert_eq!(dom.attr(node, "id"), Some("b2"));
        }
    }

    mod property_tests {
        use super::*;

        fn arb_locator() -> impl Strategy<Value = Locator> {
            let base = prop_oneof![
                Just(Locator::role(AriaRole::Link)),
                Just(Locator::role(AriaRole::Listitem)),
                Just(Locator::role(AriaRole::Button).with_name("book")),
                Just(Locator::text("buffet")),
                Just(Locator::id("amount")),
                "[a-z]{0,4}".prop_map(Locator::text),
            ];
            (base, prop::option::of(0usize..4), any::<bool>()).prop_map(|(locator, nth, scoped)| {
                let locator = if scoped {
                    locator.within(Locator::role(AriaRole::List))
                } else {
                    locator
                };
                match nth {
                    Some(i) => locator.nth(i),
                    None => locator,
                }
            })
        }

        proptest! {
            #[test]
            fn prop_resolution_is_idempotent(locator in arb_locator()) {
                let dom = dom();
                prop_assert_eq!(resolve(&dom, &locator), resolve(&dom, &locator));
            }

            #[test]
            fn prop_results_unique_and_attached(locator in arb_locator()) {
                let dom = dom();
                let found = resolve(&dom, &locator);
                let unique: HashSet<_> = found.iter().collect();
                prop_assert_eq!(unique.len(), found.len());
                prop_assert!(found.iter().all(|n| dom.is_attached(*n)));
            }

            #[test]
            fn prop_pick_yields_at_most_one(locator in arb_locator(), i in 0usize..4) {
                let dom = dom();
                prop_assert!(resolve(&dom, &locator.nth(i)).len() <= 1);
            }
        }
    }
}
