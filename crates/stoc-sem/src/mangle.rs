//! Name mangling (spec.md §4.3.6).
//!
//! Format: `name_Np_T1T2…TN_rR`. `main` is exempt so the emitted IR's
//! entry point stays unmangled; variables, constants, and parameters are
//! never mangled, their mangled name just equals their source name.

use stoc_util::Signature;

pub fn mangle(name: &str, signature: &Signature) -> String {
    if name == "main" {
        return name.to_string();
    }

    let mut mangled = String::from(name);
    mangled.push('_');
    mangled.push_str(&signature.params.len().to_string());
    mangled.push_str("p_");
    for param in &signature.params {
        mangled.push_str(param.name());
    }
    mangled.push_str("_r");
    mangled.push_str(signature.result.name());
    mangled
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoc_util::BasicType;

    #[test]
    fn main_is_never_mangled() {
        let sig = Signature::new(vec![], BasicType::Void);
        assert_eq!(mangle("main", &sig), "main");
    }

    #[test]
    fn overloads_mangle_distinctly() {
        let int_sig = Signature::new(vec![BasicType::Int, BasicType::Int], BasicType::Int);
        let float_sig = Signature::new(vec![BasicType::Float, BasicType::Float], BasicType::Float);
        assert_eq!(mangle("add", &int_sig), "add_2p_intint_rint");
        assert_eq!(mangle("add", &float_sig), "add_2p_floatfloat_rfloat");
    }
}
