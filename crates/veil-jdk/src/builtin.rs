use veil_classfile::{AccessFlags, ClassStub, FieldStub, MethodStub, OBJECT};

const PUBLIC: u16 = AccessFlags::PUBLIC;
const PUBLIC_ABSTRACT: u16 = AccessFlags::PUBLIC | AccessFlags::ABSTRACT;
const PUBLIC_FINAL: u16 = AccessFlags::PUBLIC | AccessFlags::FINAL;
const PUBLIC_FINAL_NATIVE: u16 = AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::NATIVE;
const PROTECTED: u16 = AccessFlags::PROTECTED;
const PUBLIC_STATIC: u16 = AccessFlags::PUBLIC | AccessFlags::STATIC;
const INTERFACE: u16 = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
const ANNOTATION: u16 = INTERFACE | AccessFlags::ANNOTATION;

struct Builder(ClassStub);

impl Builder {
    fn class(name: &str, flags: u16, super_class: Option<&str>) -> Self {
        Self(ClassStub {
            internal_name: name.to_string(),
            access_flags: AccessFlags::new(flags),
            super_class: super_class.map(str::to_string),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        })
    }

    fn interface(name: &str, flags: u16) -> Self {
        Self::class(name, flags, Some(OBJECT))
    }

    fn implements(mut self, interfaces: &[&str]) -> Self {
        self.0
            .interfaces
            .extend(interfaces.iter().map(|s| s.to_string()));
        self
    }

    fn method(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        self.0.methods.push(MethodStub {
            access_flags: AccessFlags::new(flags),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: Vec::new(),
        });
        self
    }

    fn field(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        self.0.fields.push(FieldStub {
            access_flags: AccessFlags::new(flags),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }
}

pub(crate) fn stubs() -> Vec<ClassStub> {
    vec![
        Builder::class(OBJECT, PUBLIC, None)
            .method(PUBLIC, "<init>", "()V")
            .method(PUBLIC_FINAL_NATIVE, "getClass", "()Ljava/lang/Class;")
            .method(PUBLIC, "hashCode", "()I")
            .method(PUBLIC, "equals", "(Ljava/lang/Object;)Z")
            .method(PROTECTED | AccessFlags::NATIVE, "clone", "()Ljava/lang/Object;")
            .method(PUBLIC, "toString", "()Ljava/lang/String;")
            .method(PUBLIC_FINAL_NATIVE, "notify", "()V")
            .method(PUBLIC_FINAL_NATIVE, "notifyAll", "()V")
            .method(PUBLIC_FINAL, "wait", "()V")
            .method(PROTECTED, "finalize", "()V")
            .0,
        Builder::class("java/lang/String", PUBLIC_FINAL, Some(OBJECT))
            .implements(&["java/io/Serializable", "java/lang/Comparable"])
            .method(PUBLIC, "<init>", "()V")
            .method(PUBLIC, "length", "()I")
            .method(PUBLIC, "charAt", "(I)C")
            .method(PUBLIC, "isEmpty", "()Z")
            .method(PUBLIC, "equals", "(Ljava/lang/Object;)Z")
            .method(PUBLIC, "hashCode", "()I")
            .method(PUBLIC, "toString", "()Ljava/lang/String;")
            .method(PUBLIC, "compareTo", "(Ljava/lang/String;)I")
            .method(
                PUBLIC | AccessFlags::BRIDGE | AccessFlags::SYNTHETIC,
                "compareTo",
                "(Ljava/lang/Object;)I",
            )
            .method(PUBLIC_STATIC, "valueOf", "(Ljava/lang/Object;)Ljava/lang/String;")
            .0,
        Builder::class(
            "java/lang/Enum",
            PUBLIC_ABSTRACT | AccessFlags::ENUM,
            Some(OBJECT),
        )
        .implements(&["java/lang/Comparable", "java/io/Serializable"])
        .method(PROTECTED, "<init>", "(Ljava/lang/String;I)V")
        .method(PUBLIC_FINAL, "name", "()Ljava/lang/String;")
        .method(PUBLIC_FINAL, "ordinal", "()I")
        .method(PUBLIC, "toString", "()Ljava/lang/String;")
        .method(PUBLIC_FINAL, "equals", "(Ljava/lang/Object;)Z")
        .method(PUBLIC_FINAL, "hashCode", "()I")
        .method(PUBLIC_FINAL, "compareTo", "(Ljava/lang/Enum;)I")
        .method(
            PUBLIC_STATIC,
            "valueOf",
            "(Ljava/lang/Class;Ljava/lang/String;)Ljava/lang/Enum;",
        )
        .0,
        Builder::class("java/lang/Record", PUBLIC_ABSTRACT, Some(OBJECT))
            .method(PROTECTED, "<init>", "()V")
            .method(PUBLIC_ABSTRACT, "equals", "(Ljava/lang/Object;)Z")
            .method(PUBLIC_ABSTRACT, "hashCode", "()I")
            .method(PUBLIC_ABSTRACT, "toString", "()Ljava/lang/String;")
            .0,
        Builder::class("java/lang/Class", PUBLIC_FINAL, Some(OBJECT))
            .method(PUBLIC, "getName", "()Ljava/lang/String;")
            .0,
        Builder::class("java/lang/Throwable", PUBLIC, Some(OBJECT))
            .implements(&["java/io/Serializable"])
            .method(PUBLIC, "<init>", "()V")
            .method(PUBLIC, "<init>", "(Ljava/lang/String;)V")
            .method(PUBLIC, "getMessage", "()Ljava/lang/String;")
            .0,
        Builder::class("java/lang/Exception", PUBLIC, Some("java/lang/Throwable"))
            .method(PUBLIC, "<init>", "()V")
            .method(PUBLIC, "<init>", "(Ljava/lang/String;)V")
            .0,
        Builder::class(
            "java/lang/RuntimeException",
            PUBLIC,
            Some("java/lang/Exception"),
        )
        .method(PUBLIC, "<init>", "()V")
        .method(PUBLIC, "<init>", "(Ljava/lang/String;)V")
        .0,
        Builder::class("java/lang/System", PUBLIC_FINAL, Some(OBJECT))
            .field(PUBLIC_STATIC | AccessFlags::FINAL, "out", "Ljava/io/PrintStream;")
            .method(PUBLIC_STATIC | AccessFlags::NATIVE, "currentTimeMillis", "()J")
            .0,
        Builder::interface("java/lang/Runnable", INTERFACE)
            .method(PUBLIC_ABSTRACT, "run", "()V")
            .0,
        Builder::interface("java/lang/Comparable", INTERFACE)
            .method(PUBLIC_ABSTRACT, "compareTo", "(Ljava/lang/Object;)I")
            .0,
        Builder::interface("java/lang/Iterable", INTERFACE)
            .method(PUBLIC_ABSTRACT, "iterator", "()Ljava/util/Iterator;")
            .method(PUBLIC, "forEach", "(Ljava/util/function/Consumer;)V")
            .0,
        Builder::interface("java/lang/AutoCloseable", INTERFACE)
            .method(PUBLIC_ABSTRACT, "close", "()V")
            .0,
        Builder::interface("java/lang/Cloneable", INTERFACE).0,
        Builder::interface("java/io/Serializable", INTERFACE).0,
        Builder::interface("java/util/function/Function", INTERFACE)
            .method(PUBLIC_ABSTRACT, "apply", "(Ljava/lang/Object;)Ljava/lang/Object;")
            .method(
                PUBLIC,
                "andThen",
                "(Ljava/util/function/Function;)Ljava/util/function/Function;",
            )
            .0,
        Builder::interface("java/util/function/Supplier", INTERFACE)
            .method(PUBLIC_ABSTRACT, "get", "()Ljava/lang/Object;")
            .0,
        Builder::interface("java/util/function/Consumer", INTERFACE)
            .method(PUBLIC_ABSTRACT, "accept", "(Ljava/lang/Object;)V")
            .0,
        Builder::interface("java/lang/annotation/Annotation", INTERFACE)
            .method(PUBLIC_ABSTRACT, "annotationType", "()Ljava/lang/Class;")
            .method(PUBLIC_ABSTRACT, "equals", "(Ljava/lang/Object;)Z")
            .method(PUBLIC_ABSTRACT, "hashCode", "()I")
            .method(PUBLIC_ABSTRACT, "toString", "()Ljava/lang/String;")
            .0,
        Builder::interface("java/lang/FunctionalInterface", ANNOTATION)
            .implements(&["java/lang/annotation/Annotation"])
            .0,
    ]
}
