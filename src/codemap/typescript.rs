//! TypeScript and TSX grammars. Queries and span conversion come from the
//! JavaScript adapter.

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

pub(super) fn tsx_grammar() -> tree_sitter::Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::codemap::{generate_codemap, MapOptions, SourceFile};

    fn condense(path: &str, code: &str, max: usize) -> String {
        let file = SourceFile::new(Path::new(path), code);
        generate_codemap(&file, &MapOptions::with_max_literal_len(max)).unwrap()
    }

    #[test]
    fn test_interfaces_and_types_kept() {
        let code = r#"
export interface User {
    id: string;
    name: string;
}

export type Role = "admin" | "member";
"#;
        assert_eq!(condense("types.ts", code, 50), code.trim());
    }

    #[test]
    fn test_typed_function_and_class() {
        let code = r#"
export async function loadUser(id: string): Promise<User> {
    const res = await fetch(`/users/${id}`);
    return res.json();
}

export class UserService {
    private cache = new Map<string, User>();

    get(id: string): User | undefined {
        return this.cache.get(id);
    }
}
"#;
        let expected = r#"export async function loadUser(id: string): Promise<User>

export class UserService {
    private cache = new Map<string, User>();

    get(id: string): User | undefined
}"#;
        assert_eq!(condense("service.ts", code, 50), expected);
    }

    #[test]
    fn test_abstract_and_overload_signatures_kept() {
        let code = "abstract class Shape {\n    abstract area(): number;\n}\nfunction parse(x: string): number;\n";
        assert_eq!(condense("shape.ts", code, 50), code.trim());
    }

    #[test]
    fn test_tsx_component() {
        let code = r#"
export const Banner = ({ title }: Props) => {
    return <h1 className="banner">{title}</h1>;
};

const LABEL = "A label that is far too long";
"#;
        let expected = "export const Banner = ({ title }: Props) =>;\n\nconst LABEL = \"A label...\";";
        assert_eq!(condense("Banner.tsx", code, 7), expected);
    }
}
