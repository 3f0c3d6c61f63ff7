use swc_ecma_ast::{Expr, Stmt};

use crate::parser::Parser;

use super::RefactorError;

/// A name that may be bound by a rename: it must parse, on its own, as a
/// script consisting of exactly that identifier. The implicit `arguments`
/// binding is refused.
pub fn check_name(name: &str) -> Result<(), RefactorError> {
    if name != "arguments" && parses_as_identifier(name) {
        Ok(())
    } else {
        tracing::debug!(name, "rejected variable name");
        Err(RefactorError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn parses_as_identifier(name: &str) -> bool {
    let Ok(script) = Parser::new().parse_script(name) else {
        return false;
    };

    match script.body.as_slice() {
        [Stmt::Expr(stmt)] => matches!(&*stmt.expr, Expr::Ident(ident) if &*ident.sym == name),
        _ => false,
    }
}
