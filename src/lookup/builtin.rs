//! Built-in `java.base` stubs: the library types the analyses consult.

use super::provider::InMemoryProvider;

const MODULE_INFO: &str = "module java.base {
    exports java.lang;
    exports java.lang.annotation;
    exports java.io;
    exports java.util;
    exports java.util.function;
    exports org.eclipse.jdt.annotation;
}";

const STUBS: &[(&str, &str)] = &[
    (
        "java/lang/Object.java",
        "package java.lang;
public class Object {
    public Object() {}
    public boolean equals(Object obj);
    public int hashCode();
    public String toString();
    public final Class<?> getClass();
}",
    ),
    (
        "java/lang/String.java",
        "package java.lang;
public final class String implements CharSequence, Comparable<String>, java.io.Serializable {
    public int length();
    public char charAt(int index);
    public boolean isEmpty();
    public String substring(int begin);
    public String trim();
    public String toUpperCase();
    public String toLowerCase();
    public boolean startsWith(String prefix);
    public String concat(String str);
    public int compareTo(String other);
    public static String valueOf(Object obj);
    public static String format(String format, Object... args);
}",
    ),
    ("java/lang/CharSequence.java", "package java.lang;\npublic interface CharSequence { int length(); char charAt(int index); }"),
    ("java/lang/Comparable.java", "package java.lang;\npublic interface Comparable<T> { int compareTo(T o); }"),
    ("java/lang/Runnable.java", "package java.lang;\n@FunctionalInterface\npublic interface Runnable { void run(); }"),
    ("java/lang/Iterable.java", "package java.lang;\npublic interface Iterable<T> { java.util.Iterator<T> iterator(); }"),
    ("java/lang/AutoCloseable.java", "package java.lang;\npublic interface AutoCloseable { void close() throws Exception; }"),
    ("java/lang/Cloneable.java", "package java.lang;\npublic interface Cloneable {}"),
    ("java/lang/Number.java", "package java.lang;\npublic abstract class Number { public abstract int intValue(); }"),
    (
        "java/lang/Integer.java",
        "package java.lang;
public final class Integer extends Number implements Comparable<Integer> {
    public static final int MAX_VALUE = 2147483647;
    public int intValue();
    public static Integer valueOf(int i);
    public static int parseInt(String s);
    public int compareTo(Integer other);
}",
    ),
    ("java/lang/Long.java", "package java.lang;\npublic final class Long extends Number { public int intValue(); public static Long valueOf(long l); }"),
    (
        "java/lang/Boolean.java",
        "package java.lang;
public final class Boolean {
    public static final Boolean TRUE = new Boolean(true);
    public static final Boolean FALSE = new Boolean(false);
    public Boolean(boolean value) {}
    public boolean booleanValue();
    public static Boolean valueOf(boolean b);
}",
    ),
    ("java/lang/Character.java", "package java.lang;\npublic final class Character { public char charValue(); }"),
    ("java/lang/Double.java", "package java.lang;\npublic final class Double extends Number { public int intValue(); public double doubleValue(); }"),
    (
        "java/lang/Math.java",
        "package java.lang;
public final class Math {
    public static int max(int a, int b);
    public static int min(int a, int b);
    public static int abs(int a);
}",
    ),
    (
        "java/lang/System.java",
        "package java.lang;
public final class System {
    public static final java.io.PrintStream out = null;
    public static final java.io.PrintStream err = null;
    public static long currentTimeMillis();
    public static void exit(int status);
}",
    ),
    ("java/lang/StringBuilder.java", "package java.lang;\npublic final class StringBuilder implements CharSequence { public StringBuilder() {} public StringBuilder append(Object o); public String toString(); public int length(); public char charAt(int index); }"),
    ("java/lang/Class.java", "package java.lang;\npublic final class Class<T> { public String getName(); }"),
    ("java/lang/Enum.java", "package java.lang;\npublic abstract class Enum<E extends Enum<E>> implements Comparable<E> { public final String name(); public final int ordinal(); }"),
    ("java/lang/Thread.java", "package java.lang;\npublic class Thread implements Runnable { public Thread(Runnable target) {} public void start(); public void run(); }"),
    ("java/lang/Throwable.java", "package java.lang;\npublic class Throwable { public Throwable() {} public Throwable(String message) {} public String getMessage(); public void printStackTrace(); }"),
    ("java/lang/Exception.java", "package java.lang;\npublic class Exception extends Throwable { public Exception() {} public Exception(String message) {} }"),
    ("java/lang/Error.java", "package java.lang;\npublic class Error extends Throwable { public Error() {} }"),
    ("java/lang/RuntimeException.java", "package java.lang;\npublic class RuntimeException extends Exception { public RuntimeException() {} public RuntimeException(String message) {} }"),
    ("java/lang/IllegalArgumentException.java", "package java.lang;\npublic class IllegalArgumentException extends RuntimeException { public IllegalArgumentException() {} public IllegalArgumentException(String message) {} }"),
    ("java/lang/IllegalStateException.java", "package java.lang;\npublic class IllegalStateException extends RuntimeException { public IllegalStateException() {} public IllegalStateException(String message) {} }"),
    ("java/lang/NullPointerException.java", "package java.lang;\npublic class NullPointerException extends RuntimeException { public NullPointerException() {} }"),
    ("java/lang/Override.java", "package java.lang;\nimport java.lang.annotation.*;\n@Target(ElementType.METHOD)\npublic @interface Override {}"),
    ("java/lang/Deprecated.java", "package java.lang;\nimport java.lang.annotation.*;\nimport static java.lang.annotation.ElementType.*;\n@Target({CONSTRUCTOR, FIELD, LOCAL_VARIABLE, METHOD, PACKAGE, MODULE, PARAMETER, TYPE})\npublic @interface Deprecated {}"),
    ("java/lang/FunctionalInterface.java", "package java.lang;\nimport java.lang.annotation.*;\n@Target(ElementType.TYPE)\npublic @interface FunctionalInterface {}"),
    ("java/lang/SuppressWarnings.java", "package java.lang;\nimport java.lang.annotation.*;\nimport static java.lang.annotation.ElementType.*;\n@Target({TYPE, FIELD, METHOD, PARAMETER, CONSTRUCTOR, LOCAL_VARIABLE, MODULE})\npublic @interface SuppressWarnings { String[] value(); }"),
    ("java/lang/SafeVarargs.java", "package java.lang;\nimport java.lang.annotation.*;\n@Target({ElementType.CONSTRUCTOR, ElementType.METHOD})\npublic @interface SafeVarargs {}"),
    ("java/lang/annotation/Retention.java", "package java.lang.annotation;\n@Target(ElementType.ANNOTATION_TYPE)\npublic @interface Retention {}"),
    ("java/lang/annotation/Target.java", "package java.lang.annotation;\n@Target(ElementType.ANNOTATION_TYPE)\npublic @interface Target { ElementType[] value(); }"),
    ("java/lang/annotation/ElementType.java", "package java.lang.annotation;\npublic enum ElementType { TYPE, FIELD, METHOD, PARAMETER, CONSTRUCTOR, LOCAL_VARIABLE, ANNOTATION_TYPE, PACKAGE, TYPE_PARAMETER, TYPE_USE, MODULE, RECORD_COMPONENT }"),
    ("java/io/Serializable.java", "package java.io;\npublic interface Serializable {}"),
    ("java/io/Closeable.java", "package java.io;\npublic interface Closeable extends AutoCloseable { void close() throws IOException; }"),
    ("java/io/IOException.java", "package java.io;\npublic class IOException extends Exception { public IOException() {} }"),
    (
        "java/io/PrintStream.java",
        "package java.io;
public class PrintStream {
    public void println(Object x);
    public void println(String x);
    public void println(int x);
    public void println();
    public void print(Object x);
    public PrintStream printf(String format, Object... args);
}",
    ),
    ("java/util/Iterator.java", "package java.util;\npublic interface Iterator<E> { boolean hasNext(); E next(); }"),
    (
        "java/util/Collection.java",
        "package java.util;
public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean add(E e);
    boolean contains(Object o);
}",
    ),
    (
        "java/util/List.java",
        "package java.util;
public interface List<E> extends Collection<E> {
    E get(int index);
    E set(int index, E element);
    E remove(int index);
}",
    ),
    ("java/util/Set.java", "package java.util;\npublic interface Set<E> extends Collection<E> {}"),
    ("java/util/ArrayList.java", "package java.util;\npublic class ArrayList<E> implements List<E> { public ArrayList() {} public E get(int index); public boolean add(E e); public int size(); }"),
    ("java/util/HashSet.java", "package java.util;\npublic class HashSet<E> implements Set<E> { public HashSet() {} public boolean add(E e); public int size(); }"),
    (
        "java/util/Map.java",
        "package java.util;
public interface Map<K, V> {
    V get(Object key);
    V put(K key, V value);
    boolean containsKey(Object key);
    int size();
    interface Entry<K, V> { K getKey(); V getValue(); }
}",
    ),
    ("java/util/HashMap.java", "package java.util;\npublic class HashMap<K, V> implements Map<K, V> { public HashMap() {} public V get(Object key); public V put(K key, V value); }"),
    (
        "java/util/Objects.java",
        "package java.util;
public final class Objects {
    public static boolean equals(Object a, Object b);
    public static int hashCode(Object o);
    public static <T> T requireNonNull(T obj);
}",
    ),
    (
        "java/util/Optional.java",
        "package java.util;
public final class Optional<T> {
    public static <T> Optional<T> of(T value);
    public static <T> Optional<T> empty();
    public T get();
    public boolean isPresent();
    public T orElse(T other);
}",
    ),
    ("java/util/function/Function.java", "package java.util.function;\n@FunctionalInterface\npublic interface Function<T, R> { R apply(T t); }"),
    ("java/util/function/BiFunction.java", "package java.util.function;\n@FunctionalInterface\npublic interface BiFunction<T, U, R> { R apply(T t, U u); }"),
    ("java/util/function/Supplier.java", "package java.util.function;\n@FunctionalInterface\npublic interface Supplier<T> { T get(); }"),
    ("java/util/function/Consumer.java", "package java.util.function;\n@FunctionalInterface\npublic interface Consumer<T> { void accept(T t); }"),
    ("java/util/function/BiConsumer.java", "package java.util.function;\n@FunctionalInterface\npublic interface BiConsumer<T, U> { void accept(T t, U u); }"),
    ("java/util/function/Predicate.java", "package java.util.function;\n@FunctionalInterface\npublic interface Predicate<T> { boolean test(T t); }"),
    ("java/util/function/UnaryOperator.java", "package java.util.function;\n@FunctionalInterface\npublic interface UnaryOperator<T> extends Function<T, T> {}"),
    ("java/util/function/BinaryOperator.java", "package java.util.function;\n@FunctionalInterface\npublic interface BinaryOperator<T> extends BiFunction<T, T, T> {}"),
    ("java/util/function/IntFunction.java", "package java.util.function;\n@FunctionalInterface\npublic interface IntFunction<R> { R apply(int value); }"),
    ("org/eclipse/jdt/annotation/NonNull.java", "package org.eclipse.jdt.annotation;\npublic @interface NonNull {}"),
    ("org/eclipse/jdt/annotation/Nullable.java", "package org.eclipse.jdt.annotation;\npublic @interface Nullable {}"),
    ("org/eclipse/jdt/annotation/NonNullByDefault.java", "package org.eclipse.jdt.annotation;\npublic @interface NonNullByDefault { boolean value() default true; }"),
];

/// The `java.base` module used when no other provider declares it.
pub fn jdk() -> InMemoryProvider {
    let mut provider = InMemoryProvider::new("jrt").with_module(MODULE_INFO);
    for (path, source) in STUBS {
        provider.add_file(path, source);
    }
    provider
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::provider::TypeProvider;
    use crate::parser::parse_java;

    #[test]
    fn every_stub_parses() {
        let provider = jdk();
        for (path, source) in STUBS {
            if let Err(err) = parse_java(source) {
                panic!("{} does not parse: {}", path, err);
            }
        }
        assert!(provider.module_source().is_some());
        assert!(provider.has_package("java.util.function"));
    }
}
