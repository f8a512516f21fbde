#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use symnav_lsp::Backend;
use symnav_lsp::analysis::builder::PackageBuilder;
use symnav_lsp::analysis::snapshot::SnapshotTypeChecker;
use symnav_lsp::analysis::{AnalyzedPackage, RequestContext};
use symnav_lsp::types::{Object, ObjectKind, ObjectScope, Pos, SyntaxNode, Type, TypeName};
use tower_lsp::lsp_types::*;

pub const CART_URI: &str = "file:///ws/shop/cart.go";
pub const FMT_URI: &str = "file:///go/src/fmt/print.go";
pub const SHOP: &str = "example.com/shop";

/// Source of the fixture package, line by line:
///
/// ```text
///  0 package shop
///  2 import "fmt"
///  4 // Cart holds line items.
///  5 type Cart struct {
///  6 	Items []string
///  7 }
///  9 func Checkout() {
/// 10 	total := 42
/// 11 	cart := &Cart{}
/// 12 	count := len(cart.Items)
/// 13 	fmt.Println(total, count, cart)
/// 14 	_ = ghost
/// 15 }
/// ```
pub const CART_SRC: &str = "package shop

import \"fmt\"

// Cart holds line items.
type Cart struct {
\tItems []string
}

func Checkout() {
\ttotal := 42
\tcart := &Cart{}
\tcount := len(cart.Items)
\tfmt.Println(total, count, cart)
\t_ = ghost
}
";

pub const FMT_SRC: &str = "package fmt

func Println(a ...any) (n int, err error) { return }
";

pub fn uri(s: &str) -> Url {
    Url::parse(s).expect("valid uri")
}

fn object(name: &str, kind: ObjectKind, pos: Pos, ty: Option<Type>, scope: ObjectScope) -> Object {
    Object {
        name: name.to_string(),
        kind,
        pos,
        ty,
        parent: None,
        package: None,
        scope,
    }
}

fn basic(name: &str) -> Type {
    Type::Basic {
        name: name.to_string(),
    }
}

/// Analysis of [`CART_SRC`], as a type checker would produce it.
pub fn shop_package() -> AnalyzedPackage {
    let mut b = PackageBuilder::new(SHOP, "shop");
    let f = b.add_file(uri(CART_URI), CART_SRC);
    let fmt_file = b.add_external_file(uri(FMT_URI), FMT_SRC);

    let span = |b: &PackageBuilder, needle: &str, nth: usize| {
        b.span_of(f, needle, nth).expect("needle in fixture")
    };
    let ident = |b: &mut PackageBuilder, name: &str, nth: usize| {
        b.ident(f, name, nth).expect("identifier in fixture")
    };

    // type Cart struct { Items []string }
    let cart_decl = ident(&mut b, "Cart", 1);
    let cart_type = TypeName {
        name: "Cart".to_string(),
        pos: cart_decl.pos,
        end: None,
        package: Some(SHOP.to_string()),
    };
    let cart_named = Type::Named(cart_type.clone());
    let cart_obj = b.object(object(
        "Cart",
        ObjectKind::TypeName,
        cart_decl.pos,
        Some(cart_named.clone()),
        ObjectScope::Package,
    ));
    b.define(&cart_decl, Some(cart_obj));

    let items_decl = ident(&mut b, "Items", 0);
    let mut items = object(
        "Items",
        ObjectKind::Field,
        items_decl.pos,
        Some(Type::Slice {
            elem: Box::new(basic("string")),
        }),
        ObjectScope::Package,
    );
    items.parent = Some("Cart".to_string());
    let items_obj = b.object(items);
    b.define(&items_decl, Some(items_obj));

    // func Checkout() { ... }
    let checkout_decl = ident(&mut b, "Checkout", 0);
    let checkout_obj = b.object(object(
        "Checkout",
        ObjectKind::Func,
        checkout_decl.pos,
        Some(Type::Signature),
        ObjectScope::Package,
    ));
    b.define(&checkout_decl, Some(checkout_obj));

    let total_decl = ident(&mut b, "total", 0);
    let total_use = ident(&mut b, "total", 1);
    let total_obj = b.object(object(
        "total",
        ObjectKind::Var,
        total_decl.pos,
        Some(basic("int")),
        ObjectScope::Local,
    ));
    b.define(&total_decl, Some(total_obj));
    b.refer(&total_use, total_obj);

    let cart_var_decl = ident(&mut b, "cart", 0);
    let cart_var_sel = ident(&mut b, "cart", 1);
    let cart_var_use = ident(&mut b, "cart", 2);
    let cart_var_obj = b.object(object(
        "cart",
        ObjectKind::Var,
        cart_var_decl.pos,
        Some(Type::Pointer {
            elem: Box::new(cart_named.clone()),
        }),
        ObjectScope::Local,
    ));
    b.define(&cart_var_decl, Some(cart_var_obj));
    b.refer(&cart_var_sel, cart_var_obj);
    b.refer(&cart_var_use, cart_var_obj);

    let cart_lit = ident(&mut b, "Cart", 2);
    b.refer(&cart_lit, cart_obj);
    b.record_type(&cart_lit, cart_named.clone());

    let count_decl = ident(&mut b, "count", 0);
    let count_use = ident(&mut b, "count", 1);
    let count_obj = b.object(object(
        "count",
        ObjectKind::Var,
        count_decl.pos,
        Some(basic("int")),
        ObjectScope::Local,
    ));
    b.define(&count_decl, Some(count_obj));
    b.refer(&count_use, count_obj);

    let len_use = ident(&mut b, "len", 0);
    let len_obj = b.object(object(
        "len",
        ObjectKind::Builtin,
        Pos::NONE,
        None,
        ObjectScope::Universe,
    ));
    b.refer(&len_use, len_obj);

    let items_use = ident(&mut b, "Items", 1);
    b.refer(&items_use, items_obj);

    let fmt_use = ident(&mut b, "fmt", 1);
    let fmt_obj = b.object(object(
        "fmt",
        ObjectKind::PkgName,
        span(&b, "\"fmt\"", 0).pos,
        None,
        ObjectScope::Local,
    ));
    b.refer(&fmt_use, fmt_obj);

    let println_use = ident(&mut b, "Println", 0);
    let mut println = object(
        "Println",
        ObjectKind::Func,
        b.pos_of(fmt_file, "Println", 0).expect("Println in fmt"),
        Some(Type::Signature),
        ObjectScope::Package,
    );
    println.package = Some("fmt".to_string());
    let println_obj = b.object(println);
    b.refer(&println_use, println_obj);

    // Referenced but never declared.
    let ghost = ident(&mut b, "ghost", 0);

    b.comment(f, "// Cart holds line items.", 0)
        .expect("comment in fixture");

    let type_kw = span(&b, "type", 0);
    let struct_close = span(&b, "}\n", 0);
    let func_kw = span(&b, "func", 0);
    let file_end = b.end_of(f).expect("file end");
    let lit_42 = span(&b, "42", 0);
    let block_open = span(&b, "{\n\ttotal", 0);
    let call_len = span(&b, "len(cart.Items)", 0);
    let sel_items = span(&b, "cart.Items", 0);
    let call_println = span(&b, "fmt.Println(total, count, cart)", 0);
    let sel_println = span(&b, "fmt.Println", 0);
    let composite = span(&b, "&Cart{}", 0);

    let type_spec = SyntaxNode::type_spec_at(
        type_kw.pos,
        cart_decl,
        struct_close.pos.advance(1),
        vec![SyntaxNode::other(
            "Field",
            items_decl.pos,
            span(&b, "[]string", 0).end,
            vec![SyntaxNode::ident(items_decl)],
        )],
    );

    let block = SyntaxNode::other(
        "BlockStmt",
        block_open.pos,
        file_end,
        vec![
            SyntaxNode::ident(total_decl),
            SyntaxNode::other("BasicLit", lit_42.pos, lit_42.end, vec![]),
            SyntaxNode::ident(cart_var_decl),
            SyntaxNode::other(
                "UnaryExpr",
                composite.pos,
                composite.end,
                vec![SyntaxNode::ident(cart_lit)],
            ),
            SyntaxNode::ident(count_decl),
            SyntaxNode::other(
                "CallExpr",
                call_len.pos,
                call_len.end,
                vec![
                    SyntaxNode::ident(len_use),
                    SyntaxNode::other(
                        "SelectorExpr",
                        sel_items.pos,
                        sel_items.end,
                        vec![
                            SyntaxNode::ident(cart_var_sel),
                            SyntaxNode::ident(items_use),
                        ],
                    ),
                ],
            ),
            SyntaxNode::other(
                "CallExpr",
                call_println.pos,
                call_println.end,
                vec![
                    SyntaxNode::other(
                        "SelectorExpr",
                        sel_println.pos,
                        sel_println.end,
                        vec![SyntaxNode::ident(fmt_use), SyntaxNode::ident(println_use)],
                    ),
                    SyntaxNode::ident(total_use),
                    SyntaxNode::ident(count_use),
                    SyntaxNode::ident(cart_var_use),
                ],
            ),
            SyntaxNode::ident(ghost),
        ],
    );

    let func_decl = SyntaxNode::other(
        "FuncDecl",
        func_kw.pos,
        file_end,
        vec![SyntaxNode::ident(checkout_decl), block],
    );

    b.set_root(f, vec![type_spec, func_decl])
        .expect("root for fixture file");
    b.finish()
}

/// A backend serving [`shop_package`] for a workspace rooted at `/ws`.
pub fn create_test_backend() -> Backend {
    let checker = SnapshotTypeChecker::from_packages([shop_package()]);
    Backend::new_test()
        .with_workspace_root(PathBuf::from("/ws"))
        .with_type_checker(Arc::new(checker))
}

pub fn ctx(method: &str) -> RequestContext {
    RequestContext::new(method)
}

pub fn params(uri_str: &str, line: u32, character: u32) -> TextDocumentPositionParams {
    TextDocumentPositionParams {
        text_document: TextDocumentIdentifier { uri: uri(uri_str) },
        position: Position { line, character },
    }
}

pub fn location(uri_str: &str, line: u32, start: u32, end: u32) -> Location {
    Location {
        uri: uri(uri_str),
        range: Range {
            start: Position {
                line,
                character: start,
            },
            end: Position {
                line,
                character: end,
            },
        },
    }
}
